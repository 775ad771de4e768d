/// Statement classification. Classified from the first non-whitespace
/// keyword, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Ddl,
    Other,
}

/// A parsed statement descriptor: `{kind, referenced_tables,
/// referenced_columns, statement_subtree?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDescriptor {
    pub kind: StatementKind,
    /// Table identifiers found in FROM / JOIN / UPDATE / INTO / DELETE FROM
    /// positions, in first-occurrence order, deduplicated.
    pub referenced_tables: Vec<String>,
    /// Column identifiers found in simple predicate position
    /// (`col = ...`, `col IN (...)`, `col BETWEEN ... AND ...`).
    pub referenced_columns: Vec<String>,
    /// Opaque subtree for dialect-specific parsers that want to carry a
    /// richer AST through to the rewriter; `KeywordParser` never sets this.
    pub statement_subtree: Option<String>,
}

/// Accepts a raw SQL string and returns its statement descriptor. A
/// capability, not a concrete grammar: dialect-specific implementations are
/// pluggable behind this trait.
pub trait Parser {
    type Error;

    fn parse(&self, sql: &str) -> Result<StatementDescriptor, Self::Error>;
}
