//! Errors raised by the CMake-metadata adapter and change engine (spec §7).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChangeEngineError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CMake metadata in {path}: {reason}")]
    CmakeMetadata { path: PathBuf, reason: String },

    #[error("touch -c failed on {path}: {reason}")]
    Touch { path: PathBuf, reason: String },

    #[error("target depends on {0}, but no target produces that file")]
    UnresolvedLibDependency(PathBuf),

    #[error(transparent)]
    Parse(#[from] zen_parse::ParseError),

    #[error(transparent)]
    Core(#[from] zen_core::CoreError),

    #[error(transparent)]
    Cache(#[from] zen_cache::CacheError),
}

pub type Result<T> = std::result::Result<T, ChangeEngineError>;
