//! Unified database dialect enum
//!
//! A single source of truth for dialect identification. Rendering code asks the
//! dialect how to quote identifiers and how to spell placeholders; it never
//! branches on driver types.

/// SQL dialect for database-specific rendering
///
/// Each dialect has its own placeholder syntax and identifier quoting.
///
/// # Examples
///
/// ```
/// use mortar_types::Dialect;
///
/// let dialect = Dialect::PostgreSQL;
/// assert!(dialect.uses_numbered_placeholders());
///
/// let mysql = Dialect::MySQL;
/// assert!(!mysql.uses_numbered_placeholders());
/// assert_eq!(mysql.quote_char(), '`');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// MySQL - uses `?` positional placeholders and backtick quoting
    #[default]
    MySQL,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    PostgreSQL,

    /// SQLite - uses `?` positional placeholders
    SQLite,
}

impl Dialect {
    /// Returns `true` if this dialect uses numbered placeholders (`$1, $2, ...`)
    ///
    /// Currently only PostgreSQL uses numbered placeholders.
    /// MySQL and SQLite use positional `?` placeholders.
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    /// The character used to quote identifiers.
    #[inline]
    #[must_use]
    pub const fn quote_char(&self) -> char {
        match self {
            Dialect::MySQL => '`',
            Dialect::PostgreSQL | Dialect::SQLite => '"',
        }
    }

    /// Whether the dialect has native `TRUE`/`FALSE` keywords.
    #[inline]
    #[must_use]
    pub const fn has_boolean_literals(&self) -> bool {
        !matches!(self, Dialect::SQLite)
    }

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - MySQL: `"mysql"`, `"mariadb"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - SQLite: `"sqlite"`, `"sqlite3"`
    ///
    /// # Examples
    ///
    /// ```
    /// use mortar_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("mysql"), Some(Dialect::MySQL));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("mysql") || s.eq_ignore_ascii_case("mariadb") {
            Some(Dialect::MySQL)
        } else if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else if s.eq_ignore_ascii_case("sqlite") || s.eq_ignore_ascii_case("sqlite3") {
            Some(Dialect::SQLite)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySQL => "mysql",
            Dialect::PostgreSQL => "postgresql",
            Dialect::SQLite => "sqlite",
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DialectParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parse() {
        assert_eq!(Dialect::parse("mysql"), Some(Dialect::MySQL));
        assert_eq!(Dialect::parse("MySQL"), Some(Dialect::MySQL));
        assert_eq!(Dialect::parse("mariadb"), Some(Dialect::MySQL));

        assert_eq!(Dialect::parse("postgresql"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::parse("postgres"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::parse("PG"), Some(Dialect::PostgreSQL));

        assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
        assert_eq!(Dialect::parse("sqlite3"), Some(Dialect::SQLite));

        assert_eq!(Dialect::parse("oracle"), None);
        assert_eq!(Dialect::parse(""), None);
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("pg".parse::<Dialect>(), Ok(Dialect::PostgreSQL));
        assert_eq!("nope".parse::<Dialect>(), Err(DialectParseError));
    }

    #[test]
    fn test_dialect_quoting_and_placeholders() {
        assert!(!Dialect::MySQL.uses_numbered_placeholders());
        assert!(Dialect::PostgreSQL.uses_numbered_placeholders());
        assert!(!Dialect::SQLite.uses_numbered_placeholders());

        assert_eq!(Dialect::MySQL.quote_char(), '`');
        assert_eq!(Dialect::PostgreSQL.quote_char(), '"');
        assert_eq!(Dialect::SQLite.quote_char(), '"');
    }

    #[test]
    fn test_dialect_display() {
        assert_eq!(format!("{}", Dialect::MySQL), "mysql");
        assert_eq!(format!("{}", Dialect::PostgreSQL), "postgresql");
        assert_eq!(format!("{}", Dialect::SQLite), "sqlite");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_dialect_serde() {
        let parsed: Dialect = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(parsed, Dialect::PostgreSQL);
        assert_eq!(serde_json::to_string(&Dialect::MySQL).unwrap(), "\"mysql\"");
    }
}
