//! Storage term descriptors and the SQL column type resolver.
//!
//! Every logical field resolves, through its mapper, to a [`Term`]: the
//! physical storage descriptor the SQL visitor compiles against. All
//! classification is table-driven off [`TermKind`], so adding a field only
//! requires a table entry in the mapper, never a new conditional here.

use serde::{Deserialize, Serialize};

/// Storage classification of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// Free text; analyzed on the search engine, case-folded in SQL.
    Text,
    /// Exact string (codes, UUIDs, enums); never case-folded.
    Keyword,
    /// Integer number.
    Integer,
    /// Double-precision number.
    Double,
    /// Boolean flag.
    Boolean,
    /// Date without timezone, stored as seconds since the epoch.
    LocalDateSeconds,
    /// UTC date, stored as seconds since the epoch.
    UtcDateSeconds,
    /// UTC date, stored as milliseconds since the epoch.
    UtcDateMillis,
    /// Array of strings.
    ArrayText,
    /// Controlled-vocabulary term, stored as a concept with its lineage.
    Vocabulary,
    /// Extension term stored outside the core row.
    Extension,
}

/// A physical storage term: column name plus storage classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term {
    /// Bare column/field name.
    pub name: &'static str,
    /// Storage classification.
    pub kind: TermKind,
}

impl Term {
    /// Creates a term descriptor.
    #[must_use]
    pub const fn new(name: &'static str, kind: TermKind) -> Self {
        Self { name, kind }
    }
}

/// Reserved SQL keywords that must be quoted when used as bare column names.
pub const SQL_RESERVED_WORDS: [&str; 4] = ["date", "order", "format", "group"];

/// Checks whether a bare column name collides with a reserved SQL keyword.
///
/// The check is case-insensitive.
#[must_use]
pub fn is_reserved_word(name: &str) -> bool {
    SQL_RESERVED_WORDS
        .iter()
        .any(|word| name.eq_ignore_ascii_case(word))
}

/// The quoted-if-necessary SQL column reference for a term.
///
/// Extension terms live in columns joined in from outside the core row
/// and carry the `ext_` prefix there.
#[must_use]
pub fn sql_column(term: Term) -> String {
    if is_extension_term(term.kind) {
        return format!("ext_{}", term.name);
    }
    if is_reserved_word(term.name) {
        format!("\"{}\"", term.name)
    } else {
        term.name.to_string()
    }
}

/// The SQL column reference used when *filtering* on a term.
///
/// Vocabulary terms filter against the full concept lineage so that a
/// query for a broad concept also matches its narrower children.
#[must_use]
pub fn sql_query_column(term: Term) -> String {
    let column = sql_column(term);
    if is_vocabulary(term.kind) {
        format!("{column}.lineage")
    } else {
        column
    }
}

/// The SQL column reference used when *reading* a term's value.
#[must_use]
pub fn sql_value_column(term: Term) -> String {
    let column = sql_column(term);
    if is_vocabulary(term.kind) {
        format!("{column}.concept")
    } else {
        column
    }
}

/// The SQL storage type of a term.
#[must_use]
pub const fn sql_type(term: Term) -> &'static str {
    match term.kind {
        TermKind::Integer => "INT",
        TermKind::LocalDateSeconds | TermKind::UtcDateSeconds | TermKind::UtcDateMillis => "BIGINT",
        TermKind::Double => "DOUBLE",
        TermKind::Boolean => "BOOLEAN",
        TermKind::ArrayText => "ARRAY<STRING>",
        TermKind::Vocabulary => "STRUCT<concept: STRING,lineage: ARRAY<STRING>>",
        TermKind::Text | TermKind::Keyword | TermKind::Extension => "STRING",
    }
}

/// True if the kind is any of the three date representations.
#[must_use]
pub const fn is_date(kind: TermKind) -> bool {
    matches!(
        kind,
        TermKind::LocalDateSeconds | TermKind::UtcDateSeconds | TermKind::UtcDateMillis
    )
}

/// True if the kind is numerical (integer or double).
#[must_use]
pub const fn is_interpreted_numerical(kind: TermKind) -> bool {
    matches!(kind, TermKind::Integer | TermKind::Double)
}

/// True if the kind is an integer.
#[must_use]
pub const fn is_interpreted_integer(kind: TermKind) -> bool {
    matches!(kind, TermKind::Integer)
}

/// True if the kind is a double.
#[must_use]
pub const fn is_interpreted_double(kind: TermKind) -> bool {
    matches!(kind, TermKind::Double)
}

/// True if the kind is a boolean flag.
#[must_use]
pub const fn is_interpreted_boolean(kind: TermKind) -> bool {
    matches!(kind, TermKind::Boolean)
}

/// True if the term is stored as a SQL array.
#[must_use]
pub const fn is_sql_array(kind: TermKind) -> bool {
    matches!(kind, TermKind::ArrayText)
}

/// True if the term is backed by a controlled vocabulary.
#[must_use]
pub const fn is_vocabulary(kind: TermKind) -> bool {
    matches!(kind, TermKind::Vocabulary)
}

/// True if the term lives in an extension outside the core row.
#[must_use]
pub const fn is_extension_term(kind: TermKind) -> bool {
    matches!(kind, TermKind::Extension)
}

/// True if the term maps to a complex SQL type (array, struct, extension).
#[must_use]
pub const fn is_complex_type(kind: TermKind) -> bool {
    matches!(
        kind,
        TermKind::ArrayText | TermKind::Vocabulary | TermKind::Extension
    )
}
