use compact_str::CompactString;

use crate::clause::{FrameBound, FrameMode, NamedWindow, OrderDef, WindowDef};
use crate::expr::Expr;
use crate::mods::{AppendWindow, Mod};

/// A window definition, optionally named for the WINDOW clause.
///
/// Frame mode and the start and end boundaries are set independently.
/// Boundaries set without [`range`](Self::range) or [`rows`](Self::rows)
/// fail at render time.
#[derive(Debug, Clone, Default)]
pub struct WindowChain {
    name: CompactString,
    def: WindowDef,
}

impl WindowChain {
    /// An anonymous window, for `OVER (...)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A named window, applied to a query's WINDOW clause.
    pub fn named(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            def: WindowDef::default(),
        }
    }

    fn map(&self, f: impl FnOnce(&mut WindowDef)) -> Self {
        let mut def = self.def.clone();
        f(&mut def);
        Self {
            name: self.name.clone(),
            def,
        }
    }

    /// Extends an existing named window.
    #[must_use]
    pub fn from(&self, base: impl Into<CompactString>) -> Self {
        let base = base.into();
        self.map(|d| d.from = Some(base))
    }

    #[must_use]
    pub fn partition_by(&self, expr: impl Into<Expr>) -> Self {
        let expr = expr.into();
        self.map(|d| d.partition_by.push(expr))
    }

    #[must_use]
    pub fn order_by(&self, term: impl Into<OrderDef>) -> Self {
        let term = term.into();
        self.map(|d| d.order_by.push(term))
    }

    #[must_use]
    pub fn range(&self) -> Self {
        self.map(|d| d.frame.mode = Some(FrameMode::Range))
    }

    #[must_use]
    pub fn rows(&self) -> Self {
        self.map(|d| d.frame.mode = Some(FrameMode::Rows))
    }

    fn start(&self, bound: FrameBound) -> Self {
        self.map(|d| d.frame.start = Some(bound))
    }

    fn end(&self, bound: FrameBound) -> Self {
        self.map(|d| d.frame.end = Some(bound))
    }

    #[must_use]
    pub fn from_unbounded_preceding(&self) -> Self {
        self.start(FrameBound::UnboundedPreceding)
    }

    #[must_use]
    pub fn from_preceding(&self, offset: impl Into<Expr>) -> Self {
        self.start(FrameBound::Preceding(offset.into()))
    }

    #[must_use]
    pub fn from_current_row(&self) -> Self {
        self.start(FrameBound::CurrentRow)
    }

    #[must_use]
    pub fn from_following(&self, offset: impl Into<Expr>) -> Self {
        self.start(FrameBound::Following(offset.into()))
    }

    #[must_use]
    pub fn to_preceding(&self, offset: impl Into<Expr>) -> Self {
        self.end(FrameBound::Preceding(offset.into()))
    }

    #[must_use]
    pub fn to_current_row(&self) -> Self {
        self.end(FrameBound::CurrentRow)
    }

    #[must_use]
    pub fn to_following(&self, offset: impl Into<Expr>) -> Self {
        self.end(FrameBound::Following(offset.into()))
    }

    #[must_use]
    pub fn to_unbounded_following(&self) -> Self {
        self.end(FrameBound::UnboundedFollowing)
    }

    pub fn def(&self) -> &WindowDef {
        &self.def
    }
}

impl<Q: AppendWindow> Mod<Q> for WindowChain {
    fn apply(&self, q: &mut Q) {
        q.append_window(NamedWindow {
            name: self.name.clone(),
            def: self.def.clone(),
        });
    }
}

impl From<WindowChain> for WindowDef {
    fn from(w: WindowChain) -> Self {
        w.def
    }
}
