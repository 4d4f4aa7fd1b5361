//! Error types for `SieveQL` translation.
//!
//! Translation either completes or fails fast: no partial query is ever
//! returned. Error codes follow the pattern `SIEVE-XXX` for easy debugging.

use thiserror::Error;

/// Result type alias for `SieveQL` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a backend query.
#[derive(Error, Debug)]
pub enum Error {
    /// A field referenced by a predicate is unknown to the active mapper
    /// (SIEVE-001).
    ///
    /// Indicates a predicate built against the wrong search domain.
    #[error("[SIEVE-001] Field '{0}' is not mapped in this search domain")]
    Mapping(String),

    /// A predicate kind has no translation rule for this backend/mapper
    /// combination (SIEVE-002).
    #[error("[SIEVE-002] Predicate is not supported by this backend: {0}")]
    UnsupportedPredicate(String),

    /// A Within predicate's geometry is invalid or unparsable (SIEVE-003).
    #[error("[SIEVE-003] Malformed geometry: {0}")]
    MalformedGeometry(String),

    /// A literal value does not parse as the field's declared type
    /// (SIEVE-004).
    #[error("[SIEVE-004] Invalid value: {0}")]
    InvalidValue(String),
}

impl Error {
    /// Returns the error code (e.g., "SIEVE-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "SIEVE-001",
            Self::UnsupportedPredicate(_) => "SIEVE-002",
            Self::MalformedGeometry(_) => "SIEVE-003",
            Self::InvalidValue(_) => "SIEVE-004",
        }
    }
}
