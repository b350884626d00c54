//! Opaque cache keys (spec §4.G): a hex digest of either a source's absolute
//! path or a `[<object_path>][CONSTRUCT][<name>]` scoped string. The digest
//! algorithm is unobservable outside a single run (per §4.E's "not observable
//! externally" clause); this uses `blake3` rather than re-deriving the
//! original's MD5 — recorded as an Open Question decision in DESIGN.md.

use std::path::Path;

/// Key under which a source file's `stripped_hash` is cached.
pub fn source_key(absolute_path: &Path) -> String {
    digest(&absolute_path.to_string_lossy())
}

/// Key under which one construct's `content_hash`, scoped to the compile
/// object that produced it, is cached.
pub fn construct_key(object_path: &Path, construct_name: &str) -> String {
    digest(&format!("[{}][CONSTRUCT][{construct_name}]", object_path.to_string_lossy()))
}

fn digest(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}
