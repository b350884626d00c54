//! Persistence contract consumed by the change engine (spec §4.G): opaque
//! hex keys over a source's absolute path or a
//! `[<object_path>][CONSTRUCT][<name>]` scoped string, mapping to 64-bit
//! content hashes, backed by a single `<build_dir>/zen_cache` JSON file.

pub mod cache;
pub mod error;
pub mod keys;

pub use cache::{HashCache, CACHE_FILE_NAME};
pub use error::{CacheError, Result};
pub use keys::{construct_key, source_key};
