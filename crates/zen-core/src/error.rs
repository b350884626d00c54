//! Error kinds shared by the source-analysis core (spec §7).

use thiserror::Error;

/// Errors raised while walking/positioning within a [`crate::Chunk`].
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A search target (bracket pair, substring-in-scope, quote end) was not
    /// found in the scanned region.
    #[error("not found: {0}")]
    NotFound(String),

    /// A structural violation: unterminated literal, invalid bounds, etc.
    #[error("parsing error: {0}")]
    Parsing(String),

    /// Invalid arguments at the call site (bad chunk bounds, non-bracket
    /// character passed to `find_pair`, unknown column keyword).
    #[error("invalid value: {0}")]
    Value(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
