//! Row scanning.
//!
//! Drivers hand back [`Rows`]; a [`Mapper`] looks at the column list once and
//! returns a [`Decoder`] that turns each [`Row`] into a `T`.

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use compact_str::CompactString;

use crate::context::Context;
use crate::error::{MortarError, Result};
use crate::value::{FromValue, Value};

// =============================================================================
// Rows
// =============================================================================

/// One result row; column names are shared by every row of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[CompactString]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[CompactString]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[CompactString] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Decodes the value at `index`.
    pub fn get_at<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).cloned().ok_or_else(|| {
            MortarError::Mapping(format!("column index {index} out of range"))
        })?;
        T::from_value(value)
    }

    /// Decodes the value of the named column.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .index_of(name)
            .ok_or_else(|| MortarError::Mapping(format!("no column named {name}")))?;
        self.get_at(index).map_err(|e| match e {
            MortarError::Mapping(msg) => MortarError::Mapping(format!("column {name}: {msg}")),
            other => other,
        })
    }
}

/// A forward-only cursor over result rows
pub trait Rows {
    fn columns(&self) -> &[CompactString];
    fn next_row(&mut self) -> Result<Option<Row>>;
}

/// Rows held in memory
#[derive(Debug, Clone)]
pub struct VecRows {
    columns: Arc<[CompactString]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl VecRows {
    pub fn new<I>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CompactString>,
    {
        Self::from_shared(columns.into_iter().map(Into::into).collect(), rows)
    }

    pub fn from_shared(columns: Arc<[CompactString]>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }

    pub fn empty() -> Self {
        Self::from_shared(Arc::from(Vec::new()), Vec::new())
    }
}

impl Rows for VecRows {
    fn columns(&self) -> &[CompactString] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        match self.rows.next() {
            Some(values) if values.len() != self.columns.len() => Err(MortarError::Execution(
                format!(
                    "row has {} values for {} columns",
                    values.len(),
                    self.columns.len()
                ),
            )),
            Some(values) => Ok(Some(Row::new(Arc::clone(&self.columns), values))),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Mappers
// =============================================================================

/// Decodes one row of a result set
pub type Decoder<T> = Box<dyn FnMut(Row) -> Result<T>>;

/// Builds a row decoder for a result set.
pub trait Mapper<T>: Send + Sync {
    fn decoder(&self, ctx: &Context, columns: &[CompactString]) -> Result<Decoder<T>>;
}

/// Types that decode themselves from a whole row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

macro_rules! impl_from_row_tuple {
    ($($name:ident => $idx:tt),+) => {
        impl<$($name: FromValue),+> FromRow for ($($name,)+) {
            fn from_row(row: &Row) -> Result<Self> {
                Ok(($(row.get_at::<$name>($idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(A => 0);
impl_from_row_tuple!(A => 0, B => 1);
impl_from_row_tuple!(A => 0, B => 1, C => 2);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

pub struct FromRowMapper<T>(PhantomData<fn() -> T>);

/// Maps rows through [`FromRow`].
pub fn from_row<T: FromRow + 'static>() -> FromRowMapper<T> {
    FromRowMapper(PhantomData)
}

impl<T: FromRow + 'static> Mapper<T> for FromRowMapper<T> {
    fn decoder(&self, _ctx: &Context, _columns: &[CompactString]) -> Result<Decoder<T>> {
        Ok(Box::new(|row: Row| T::from_row(&row)))
    }
}

pub struct SingleMapper<T>(PhantomData<fn() -> T>);

/// Maps a single-column result set to its values.
pub fn single<T: FromValue + 'static>() -> SingleMapper<T> {
    SingleMapper(PhantomData)
}

impl<T: FromValue + 'static> Mapper<T> for SingleMapper<T> {
    fn decoder(&self, _ctx: &Context, columns: &[CompactString]) -> Result<Decoder<T>> {
        if columns.len() != 1 {
            return Err(MortarError::Mapping(format!(
                "expected exactly one column, got {}",
                columns.len()
            )));
        }
        Ok(Box::new(|row: Row| {
            let value = row.into_values().into_iter().next().unwrap_or_default();
            T::from_value(value)
        }))
    }
}

pub struct MapperFn<F>(Arc<F>);

/// A mapper from a closure over each row.
pub fn mapper_fn<T: 'static, F>(f: F) -> MapperFn<F>
where
    F: Fn(&Row) -> Result<T> + Send + Sync + 'static,
{
    MapperFn(Arc::new(f))
}

impl<T: 'static, F> Mapper<T> for MapperFn<F>
where
    F: Fn(&Row) -> Result<T> + Send + Sync + 'static,
{
    fn decoder(&self, _ctx: &Context, _columns: &[CompactString]) -> Result<Decoder<T>> {
        let f = Arc::clone(&self.0);
        Ok(Box::new(move |row: Row| f(&row)))
    }
}

// =============================================================================
// Mapper mods
// =============================================================================

/// Observes a result set while it is being mapped.
pub trait MapperMod: Send + Sync {
    /// Called once with the column list, before any row is decoded.
    fn before(&self, _ctx: &Context, _columns: &[CompactString]) -> Result<()> {
        Ok(())
    }

    /// Called with every raw row before it is decoded.
    fn row(&self, _row: &Row) -> Result<()> {
        Ok(())
    }
}

struct ModdedMapper<T> {
    inner: Arc<dyn Mapper<T>>,
    mods: Vec<Arc<dyn MapperMod>>,
}

impl<T: 'static> Mapper<T> for ModdedMapper<T> {
    fn decoder(&self, ctx: &Context, columns: &[CompactString]) -> Result<Decoder<T>> {
        for m in &self.mods {
            m.before(ctx, columns)?;
        }
        let mut inner = self.inner.decoder(ctx, columns)?;
        let mods = self.mods.clone();
        Ok(Box::new(move |row: Row| {
            for m in &mods {
                m.row(&row)?;
            }
            inner(row)
        }))
    }
}

/// Wraps `mapper` so every mod observes the result set; returns it unchanged
/// when there are no mods.
pub fn with_mapper_mods<T: 'static>(
    mapper: Arc<dyn Mapper<T>>,
    mods: &[Arc<dyn MapperMod>],
) -> Arc<dyn Mapper<T>> {
    if mods.is_empty() {
        return mapper;
    }
    Arc::new(ModdedMapper {
        inner: mapper,
        mods: mods.to_vec(),
    })
}

// =============================================================================
// Scanning
// =============================================================================

/// Scans the first row; an empty result set is [`MortarError::NotFound`].
pub fn one_from_rows<T>(ctx: &Context, rows: &mut dyn Rows, mapper: &dyn Mapper<T>) -> Result<T> {
    let mut decode = mapper.decoder(ctx, rows.columns())?;
    match rows.next_row()? {
        Some(row) => decode(row),
        None => Err(MortarError::NotFound),
    }
}

/// Scans every row.
pub fn all_from_rows<T>(
    ctx: &Context,
    rows: &mut dyn Rows,
    mapper: &dyn Mapper<T>,
) -> Result<Vec<T>> {
    let mut decode = mapper.decoder(ctx, rows.columns())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next_row()? {
        out.push(decode(row)?);
    }
    Ok(out)
}

impl fmt::Debug for dyn Rows + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns())
            .finish_non_exhaustive()
    }
}
