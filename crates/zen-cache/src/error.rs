//! Errors raised loading or persisting a [`crate::HashCache`] (spec §7 `IOError`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("reading cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoding cache: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
