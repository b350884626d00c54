//! `HashCache`: the `<build_dir>/zen_cache` persistence map (spec §4.G).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const CACHE_FILE_NAME: &str = "zen_cache";

/// The persisted `string -> integer` map backing the change engine's
/// before/after comparisons. Loaded lazily on first access; a missing file
/// is tolerated as an empty map (a cache miss is "differs", never an error).
pub struct HashCache {
    path: PathBuf,
    entries: HashMap<String, i64>,
}

impl HashCache {
    /// Loads the cache at `<build_dir>/zen_cache`, or starts empty if the
    /// file does not exist yet.
    pub fn load(build_dir: &Path) -> Result<Self> {
        let path = build_dir.join(CACHE_FILE_NAME);
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    pub fn set(&mut self, key: String, value: i64) {
        self.entries.insert(key, value);
    }

    /// True when `key` is present and equals `value` — i.e. "no change".
    pub fn matches(&self, key: &str, value: i64) -> bool {
        self.get(key) == Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the whole map back in one open-truncate-write-close (spec §5:
    /// "written exactly once ... with an atomic open-truncate-write-close
    /// discipline" — no incremental rewrite).
    pub fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}
