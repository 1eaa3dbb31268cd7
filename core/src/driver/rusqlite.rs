//! [`rusqlite`] adapter.
//!
//! Rows are read eagerly into [`VecRows`], so a result set never holds a
//! borrow of the underlying statement.

use core::cell::RefCell;
use std::sync::Arc;

use compact_str::CompactString;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};

use crate::context::Context;
use crate::error::{MortarError, Result};
use crate::exec::{ExecResult, Executor, Preparer, Statement};
use crate::scan::{Rows, VecRows};
use crate::value::Value;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Bool(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*b))),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(CompactString::from_utf8_lossy(t)),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

fn collect_rows(stmt: &mut rusqlite::Statement<'_>, args: &[Value]) -> Result<VecRows> {
    let columns: Arc<[CompactString]> = stmt
        .column_names()
        .into_iter()
        .map(CompactString::from)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query(params_from_iter(args.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(Value::from(row.get_ref(i)?));
        }
        out.push(values);
    }
    Ok(VecRows::from_shared(columns, out))
}

impl Executor for Connection {
    fn exec(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<ExecResult> {
        ctx.check()?;
        let rows_affected = self.execute(sql, params_from_iter(args.iter()))?;
        Ok(ExecResult {
            rows_affected: rows_affected as u64,
            last_insert_id: Some(self.last_insert_rowid()),
        })
    }

    fn query(&self, ctx: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        ctx.check()?;
        let mut stmt = Connection::prepare(self, sql)?;
        Ok(Box::new(collect_rows(&mut stmt, args)?))
    }
}

/// A prepared rusqlite statement
pub struct SqliteStatement<'c> {
    inner: RefCell<rusqlite::Statement<'c>>,
    conn: &'c Connection,
}

impl SqliteStatement<'_> {
    fn with_inner<R>(&self, f: impl FnOnce(&mut rusqlite::Statement<'_>) -> Result<R>) -> Result<R> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| MortarError::Execution("statement is already executing".into()))?;
        f(&mut *inner)
    }
}

impl Statement for SqliteStatement<'_> {
    fn exec(&self, ctx: &Context, args: &[Value]) -> Result<ExecResult> {
        ctx.check()?;
        let rows_affected = self.with_inner(|s| Ok(s.execute(params_from_iter(args.iter()))?))?;
        Ok(ExecResult {
            rows_affected: rows_affected as u64,
            last_insert_id: Some(self.conn.last_insert_rowid()),
        })
    }

    fn query(&self, ctx: &Context, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        ctx.check()?;
        let rows = self.with_inner(|s| collect_rows(s, args))?;
        Ok(Box::new(rows))
    }
}

impl Preparer for Connection {
    type Prepared<'s> = SqliteStatement<'s>;

    fn prepare<'s>(&'s self, ctx: &Context, sql: &str) -> Result<SqliteStatement<'s>> {
        ctx.check()?;
        let stmt = Connection::prepare(self, sql).map_err(|e| MortarError::Prepare(e.to_string()))?;
        Ok(SqliteStatement {
            inner: RefCell::new(stmt),
            conn: self,
        })
    }
}
