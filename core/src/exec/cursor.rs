use core::fmt;
use std::any::Any;
use std::sync::Arc;

use crate::QueryType;
use crate::context::Context;
use crate::error::Result;
use crate::exec::Executor;
use crate::hook::{Hookable, after_query_one};
use crate::load::{Loader, run_loaders};
use crate::mortar_trace_stmt;
use crate::scan::{Decoder, Mapper, Rows};

/// A lazy, single-pass sequence of scanned values.
///
/// Loaders and the after-query hook run for each item as it is pulled. The
/// first error is yielded once and ends the sequence.
pub struct Cursor<'a, T> {
    ctx: Context,
    exec: &'a dyn Executor,
    rows: Box<dyn Rows + 'a>,
    decode: Decoder<T>,
    loaders: &'a [Arc<dyn Loader>],
    query_type: QueryType,
    done: bool,
}

impl<'a, T: Hookable + Any> Cursor<'a, T> {
    pub(crate) fn new(
        ctx: Context,
        exec: &'a dyn Executor,
        rows: Box<dyn Rows + 'a>,
        mapper: &dyn Mapper<T>,
        loaders: &'a [Arc<dyn Loader>],
        query_type: QueryType,
    ) -> Result<Self> {
        mortar_trace_stmt!("cursor", query_type);
        let decode = mapper.decoder(&ctx, rows.columns())?;
        Ok(Self {
            ctx,
            exec,
            rows,
            decode,
            loaders,
            query_type,
            done: false,
        })
    }

    fn pull(&mut self) -> Result<Option<T>> {
        self.ctx.check()?;
        let Some(row) = self.rows.next_row()? else {
            return Ok(None);
        };
        let mut value = (self.decode)(row)?;
        run_loaders(&self.ctx, self.exec, self.loaders, Some(&mut value as &mut dyn Any))?;
        after_query_one(&mut value, &self.ctx, self.exec, self.query_type)?;
        Ok(Some(value))
    }
}

impl<T: Hookable + Any> Iterator for Cursor<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.pull() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<T: Hookable + Any> core::iter::FusedIterator for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("query_type", &self.query_type)
            .field("loaders", &self.loaders.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
