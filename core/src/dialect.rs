//! Dialect type re-exported from mortar-types with core-specific extensions.

use core::fmt::Write;

/// Re-export the unified Dialect enum from mortar-types
pub use mortar_types::Dialect;

/// Extension trait for dialect-specific rendering rules
pub trait DialectExt {
    /// Writes a placeholder for this dialect with the given 1-based index.
    ///
    /// # Examples
    /// - PostgreSQL: `$1`, `$2`, `$3`
    /// - SQLite/MySQL: `?`
    fn write_placeholder(&self, w: &mut String, index: usize);

    /// Renders a placeholder as an owned string.
    fn render_placeholder(&self, index: usize) -> String {
        let mut out = String::with_capacity(4);
        self.write_placeholder(&mut out, index);
        out
    }

    /// Writes `ident` as a quoted identifier, doubling embedded quote characters.
    fn write_quoted(&self, w: &mut String, ident: &str);

    /// The literal this dialect uses for a boolean constant.
    fn bool_literal(&self, value: bool) -> &'static str;
}

impl DialectExt for Dialect {
    #[inline]
    fn write_placeholder(&self, w: &mut String, index: usize) {
        match self {
            Dialect::PostgreSQL => {
                let _ = write!(w, "${index}");
            }
            Dialect::SQLite | Dialect::MySQL => w.push('?'),
        }
    }

    fn write_quoted(&self, w: &mut String, ident: &str) {
        let q = self.quote_char();
        w.reserve(ident.len() + 2);
        w.push(q);
        for c in ident.chars() {
            if c == q {
                w.push(q);
            }
            w.push(c);
        }
        w.push(q);
    }

    #[inline]
    fn bool_literal(&self, value: bool) -> &'static str {
        match (self.has_boolean_literals(), value) {
            (true, true) => "TRUE",
            (true, false) => "FALSE",
            (false, true) => "1",
            (false, false) => "0",
        }
    }
}
