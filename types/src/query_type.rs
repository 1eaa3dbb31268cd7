/// The kind of statement a query renders to.
///
/// Handed to after-query hooks so a single hook implementation can tell a
/// `SELECT` apart from the `RETURNING` rows of an `UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QueryType {
    #[default]
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            QueryType::Unknown => "unknown",
            QueryType::Select => "select",
            QueryType::Insert => "insert",
            QueryType::Update => "update",
            QueryType::Delete => "delete",
        }
    }
}

impl core::fmt::Display for QueryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
