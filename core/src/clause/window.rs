use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::{MortarError, Result};
use crate::expr::{Expr, Expression, express_slice};
use crate::param::Params;

use super::OrderDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameMode {
    Range,
    Rows,
}

impl FrameMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FrameMode::Range => "RANGE",
            FrameMode::Rows => "ROWS",
        }
    }
}

/// One side of a window frame
#[derive(Debug, Clone)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Expr),
    CurrentRow,
    Following(Expr),
    UnboundedFollowing,
}

impl Expression for FrameBound {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        match self {
            FrameBound::UnboundedPreceding => w.push_str("UNBOUNDED PRECEDING"),
            FrameBound::CurrentRow => w.push_str("CURRENT ROW"),
            FrameBound::UnboundedFollowing => w.push_str("UNBOUNDED FOLLOWING"),
            FrameBound::Preceding(e) => {
                let params = e.write_sql(w, d, start)?;
                w.push_str(" PRECEDING");
                return Ok(params);
            }
            FrameBound::Following(e) => {
                let params = e.write_sql(w, d, start)?;
                w.push_str(" FOLLOWING");
                return Ok(params);
            }
        }
        Ok(Params::new())
    }
}

/// `{RANGE|ROWS} start` or `{RANGE|ROWS} BETWEEN start AND end`
///
/// The mode and both boundaries are set independently. Boundaries without a
/// mode, or a mode without a start, are render errors; an empty frame renders
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub mode: Option<FrameMode>,
    pub start: Option<FrameBound>,
    pub end: Option<FrameBound>,
}

impl Frame {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.start.is_none() && self.end.is_none()
    }
}

impl Expression for Frame {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let Some(mode) = self.mode else {
            if self.start.is_some() || self.end.is_some() {
                return Err(MortarError::Render(
                    "window frame boundary set without RANGE or ROWS".into(),
                ));
            }
            return Ok(Params::new());
        };
        let Some(from) = &self.start else {
            return Err(MortarError::Render(format!(
                "window frame {} has no start boundary",
                mode.as_str()
            )));
        };

        w.push_str(mode.as_str());
        w.push(' ');
        match &self.end {
            None => from.write_sql(w, d, start),
            Some(to) => {
                w.push_str("BETWEEN ");
                let mut params = from.write_sql(w, d, start)?;
                w.push_str(" AND ");
                params.extend(to.write_sql(w, d, start + params.len())?);
                Ok(params)
            }
        }
    }
}

/// The body of a window: `[base] [PARTITION BY ...] [ORDER BY ...] [frame]`
#[derive(Debug, Clone, Default)]
pub struct WindowDef {
    /// Name of an existing window this one extends
    pub from: Option<CompactString>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderDef>,
    pub frame: Frame,
}

impl Expression for WindowDef {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        let mut params = Params::new();
        let mut sep = "";

        if let Some(from) = &self.from {
            w.push_str(from);
            sep = " ";
        }

        if !self.partition_by.is_empty() {
            w.push_str(sep);
            params.extend(express_slice(
                w,
                d,
                start,
                &self.partition_by,
                "PARTITION BY ",
                ", ",
                "",
            )?);
            sep = " ";
        }

        if !self.order_by.is_empty() {
            w.push_str(sep);
            params.extend(express_slice(
                w,
                d,
                start + params.len(),
                &self.order_by,
                "ORDER BY ",
                ", ",
                "",
            )?);
            sep = " ";
        }

        if !self.frame.is_empty() {
            w.push_str(sep);
            params.extend(self.frame.write_sql(w, d, start + params.len())?);
        }

        Ok(params)
    }
}

/// `name AS (definition)` in a WINDOW clause
#[derive(Debug, Clone)]
pub struct NamedWindow {
    pub name: CompactString,
    pub def: WindowDef,
}

impl Expression for NamedWindow {
    fn write_sql(&self, w: &mut String, d: Dialect, start: usize) -> Result<Params> {
        if self.name.is_empty() {
            return Err(MortarError::Render("named window without a name".into()));
        }
        w.push_str(&self.name);
        w.push_str(" AS (");
        let params = self.def.write_sql(w, d, start)?;
        w.push(')');
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{args, render};

    #[test]
    fn test_frame_between() {
        let frame = Frame {
            mode: Some(FrameMode::Rows),
            start: Some(FrameBound::Preceding(args([3]))),
            end: Some(FrameBound::CurrentRow),
        };
        let (sql, params) = render(&frame, Dialect::PostgreSQL, 2).unwrap();
        assert_eq!(sql, "ROWS BETWEEN $2 PRECEDING AND CURRENT ROW");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_frame_start_only() {
        let frame = Frame {
            mode: Some(FrameMode::Range),
            start: Some(FrameBound::UnboundedPreceding),
            end: None,
        };
        assert_eq!(
            render(&frame, Dialect::MySQL, 1).unwrap().0,
            "RANGE UNBOUNDED PRECEDING"
        );
    }

    #[test]
    fn test_boundary_without_mode_is_error() {
        let frame = Frame {
            mode: None,
            start: Some(FrameBound::CurrentRow),
            end: None,
        };
        assert!(matches!(
            render(&frame, Dialect::MySQL, 1),
            Err(MortarError::Render(_))
        ));
    }

    #[test]
    fn test_mode_without_start_is_error() {
        let frame = Frame {
            mode: Some(FrameMode::Rows),
            start: None,
            end: Some(FrameBound::UnboundedFollowing),
        };
        assert!(matches!(
            render(&frame, Dialect::MySQL, 1),
            Err(MortarError::Render(_))
        ));
    }

    #[test]
    fn test_named_window() {
        let window = NamedWindow {
            name: "w".into(),
            def: WindowDef {
                from: Some("base".into()),
                partition_by: vec!["dept".into()],
                order_by: vec![OrderDef::new("salary")],
                frame: Frame::default(),
            },
        };
        assert_eq!(
            render(&window, Dialect::MySQL, 1).unwrap().0,
            "w AS (base PARTITION BY dept ORDER BY salary)"
        );
    }
}
