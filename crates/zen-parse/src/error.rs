//! Parse-time errors (spec §7).

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A structural violation: missing `;` after a class body, a function
    /// nested within another function, an unterminated macro continuation.
    #[error("parsing error: {0}")]
    Parsing(String),

    /// Sentinel emitted when the factory exhausts a chunk without producing
    /// a component; consumed by `Block` iteration to terminate.
    #[error("no component found in chunk")]
    ComponentCreation,

    #[error(transparent)]
    Core(#[from] zen_core::CoreError),
}

pub type Result<T> = std::result::Result<T, ParseError>;
