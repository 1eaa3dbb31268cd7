//! Eager loaders.
//!
//! A [`Loader`] runs after a retrieval has scanned its value and may populate
//! related data on it. Loaders run strictly in declaration order; the first
//! failure stops the rest and is reported with its 1-based position.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{MortarError, Result};
use crate::exec::Executor;
use crate::mortar_trace_loader;
use crate::scan::MapperMod;

pub trait Loader: Send + Sync {
    /// `retrieved` is the scanned value (a single item for `one`, the scanned
    /// `Vec<T>` for `all` whatever collection it is later gathered into), or
    /// `None` after a plain `exec`.
    fn load(&self, ctx: &Context, exec: &dyn Executor, retrieved: Option<&mut dyn Any>) -> Result<()>;
}

/// A loader from a closure over the untyped retrieved value.
pub struct LoaderFn<F>(F);

pub fn loader_fn<F>(f: F) -> LoaderFn<F>
where
    F: Fn(&Context, &dyn Executor, Option<&mut dyn Any>) -> Result<()> + Send + Sync,
{
    LoaderFn(f)
}

impl<F> Loader for LoaderFn<F>
where
    F: Fn(&Context, &dyn Executor, Option<&mut dyn Any>) -> Result<()> + Send + Sync,
{
    fn load(&self, ctx: &Context, exec: &dyn Executor, retrieved: Option<&mut dyn Any>) -> Result<()> {
        (self.0)(ctx, exec, retrieved)
    }
}

/// A loader over the scanned items of type `T`.
///
/// Sees a single `T` from `one` and cursors, and the full `Vec<T>` from `all`,
/// as a slice either way. Skipped when nothing was retrieved.
pub struct TypedLoader<T, F> {
    f: F,
    _marker: core::marker::PhantomData<fn(&mut T)>,
}

pub fn typed_loader<T, F>(f: F) -> TypedLoader<T, F>
where
    T: Any,
    F: Fn(&Context, &dyn Executor, &mut [T]) -> Result<()> + Send + Sync,
{
    TypedLoader {
        f,
        _marker: core::marker::PhantomData,
    }
}

impl<T, F> Loader for TypedLoader<T, F>
where
    T: Any,
    F: Fn(&Context, &dyn Executor, &mut [T]) -> Result<()> + Send + Sync,
{
    fn load(&self, ctx: &Context, exec: &dyn Executor, retrieved: Option<&mut dyn Any>) -> Result<()> {
        let Some(retrieved) = retrieved else {
            return Ok(());
        };
        if let Some(one) = retrieved.downcast_mut::<T>() {
            return (self.f)(ctx, exec, std::slice::from_mut(one));
        }
        match retrieved.downcast_mut::<Vec<T>>() {
            Some(all) => (self.f)(ctx, exec, all.as_mut_slice()),
            None => Err(MortarError::Other(format!(
                "loader for {} received a value of another type",
                core::any::type_name::<T>()
            ))),
        }
    }
}

/// Loaders and mapper mods declared on a query
#[derive(Clone, Default)]
pub struct Loaders {
    loaders: Vec<Arc<dyn Loader>>,
    mapper_mods: Vec<Arc<dyn MapperMod>>,
}

impl Loaders {
    pub fn append_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.push(loader);
    }

    pub fn append_mapper_mod(&mut self, m: Arc<dyn MapperMod>) {
        self.mapper_mods.push(m);
    }

    pub fn loaders(&self) -> &[Arc<dyn Loader>] {
        &self.loaders
    }

    pub fn mapper_mods(&self) -> &[Arc<dyn MapperMod>] {
        &self.mapper_mods
    }
}

impl fmt::Debug for Loaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loaders")
            .field("loaders", &self.loaders.len())
            .field("mapper_mods", &self.mapper_mods.len())
            .finish()
    }
}

/// Runs `loaders` one after another against `retrieved`.
pub fn run_loaders(
    ctx: &Context,
    exec: &dyn Executor,
    loaders: &[Arc<dyn Loader>],
    mut retrieved: Option<&mut dyn Any>,
) -> Result<()> {
    for (i, loader) in loaders.iter().enumerate() {
        ctx.check()?;
        mortar_trace_loader!(i + 1);
        let item = match retrieved {
            Some(ref mut v) => Some(&mut **v as &mut dyn Any),
            None => None,
        };
        loader
            .load(ctx, exec, item)
            .map_err(|e| MortarError::loader(i + 1, e))?;
    }
    Ok(())
}
