//! `SourceFile`: one interned handle per absolute path, lazily parsing and
//! memoizing its content (spec §3, §5).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::SystemTime;

use zen_core::{Chunk, SourceContent, SourceForm};
use zen_parse::{parse_file, Component};

use crate::error::{ChangeEngineError, Result};

const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hh", "hxx", "inl"];

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<SourceFile>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<SourceFile>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// One source file on disk, addressed by absolute path. Only one `SourceFile`
/// instance exists per path for the lifetime of the process — re-interning
/// the same path returns a handle sharing the same cached parse (spec §9
/// "Interning by path"). [`SourceFile::clear`] drops the whole registry
/// between independent `BuildDir` analyses, per spec §5.
///
/// Content and parsed components are memoized behind separate mutexes (rather
/// than one bundled struct) so [`SourceFile::components_guard`] can hand out
/// a guard whose borrowed `&Component`s outlive the call that produced them —
/// needed to build one `ConstructGraph` spanning every source of a compile
/// object at once (spec §4.F step 3).
pub struct SourceFile {
    path: PathBuf,
    is_header: bool,
    last_parse: Mutex<Option<SystemTime>>,
    content: Mutex<Option<Arc<SourceContent>>>,
    components: Mutex<Option<Vec<Component>>>,
    /// Set instead of `components` when the last parse raised a genuine
    /// structural `ParsingError` — kept separate from `content` (spec §4.F
    /// step 2's `stripped_hash` comparison is purely textual and must still
    /// succeed on a malformed file; only step 3's construct-graph walk needs
    /// the parse to have succeeded).
    parse_error: Mutex<Option<zen_parse::ParseError>>,
}

impl SourceFile {
    /// Interns `path`, returning the shared handle for its absolute form.
    pub fn intern(path: impl AsRef<Path>) -> Arc<SourceFile> {
        let absolute = absolute_path(path.as_ref());
        let mut reg = registry().lock().expect("source registry poisoned");
        reg.entry(absolute.clone())
            .or_insert_with(|| {
                Arc::new(SourceFile {
                    is_header: is_header_path(&absolute),
                    path: absolute,
                    last_parse: Mutex::new(None),
                    content: Mutex::new(None),
                    components: Mutex::new(None),
                    parse_error: Mutex::new(None),
                })
            })
            .clone()
    }

    /// Clears the process-global registry (spec §5: must happen between
    /// independent analyses to prevent stale parses leaking across runs).
    pub fn clear() {
        registry().lock().expect("source registry poisoned").clear();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_header(&self) -> bool {
        self.is_header
    }

    pub fn m_time(&self) -> Result<SystemTime> {
        fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|source| ChangeEngineError::Io { path: self.path.clone(), source })
    }

    /// Whole-file content, reparsing only when the file's mtime has advanced
    /// past the last parse (spec §5 "invalidated when the file's modification
    /// time advances past the last parse timestamp").
    pub fn content(&self) -> Result<Arc<SourceContent>> {
        self.ensure_parsed()?;
        let content = self.content.lock().expect("source content poisoned");
        Ok(content.as_ref().expect("just parsed").clone())
    }

    pub fn stripped_hash(&self) -> Result<i64> {
        Ok(self.content()?.stripped_hash())
    }

    /// Hex key under which this source's `stripped_hash` is cached (spec §4.G).
    pub fn hex(&self) -> String {
        zen_cache::source_key(&self.path)
    }

    /// Top-level parsed components, for construct-graph construction.
    pub fn with_components<R>(&self, f: impl FnOnce(&[Component]) -> R) -> Result<R> {
        let guard = self.components_guard()?;
        Ok(f(guard.as_deref().expect("just parsed")))
    }

    /// A guard over this file's parsed top-level components, reparsing first
    /// if the file's mtime has advanced. Held alongside other sources' guards
    /// to build a `ConstructGraph` spanning several files at once without
    /// cloning `Component` trees (spec §4.F step 3, §9 "graph ownership").
    ///
    /// Propagates the last parse's `ParsingError` if the file failed to
    /// parse structurally, so the change engine's conservative CHANGED
    /// fallback (spec §4.F step 5, §7) gets to see it — `content()`/
    /// `stripped_hash()` are unaffected by such a failure, since they only
    /// need the textual form.
    pub fn components_guard(&self) -> Result<MutexGuard<'_, Option<Vec<Component>>>> {
        self.ensure_parsed()?;
        if let Some(err) = self.parse_error.lock().expect("source parse_error poisoned").clone() {
            return Err(ChangeEngineError::Parse(err));
        }
        Ok(self.components.lock().expect("source components poisoned"))
    }

    /// Re-reads and re-splits the file into lines/comments, and attempts to
    /// parse it into components, whenever the file's mtime has advanced past
    /// the last attempt. The textual `content` is always recorded, even when
    /// component parsing fails; only `components`/`parse_error` reflect the
    /// structural outcome.
    fn ensure_parsed(&self) -> Result<()> {
        let mtime = self.m_time()?;
        let mut last_parse = self.last_parse.lock().expect("source last_parse poisoned");
        let stale = match *last_parse {
            Some(last) => mtime > last,
            None => true,
        };
        if stale {
            let raw = fs::read_to_string(&self.path).map_err(|source| ChangeEngineError::Io {
                path: self.path.clone(),
                source,
            })?;
            let content = SourceContent::new(&raw);
            let whole = Chunk::whole(content.clone(), SourceForm::Stripped);
            *self.content.lock().expect("source content poisoned") = Some(content);
            match parse_file(whole) {
                Ok(block) => {
                    *self.components.lock().expect("source components poisoned") = Some(block.children);
                    *self.parse_error.lock().expect("source parse_error poisoned") = None;
                }
                Err(err) => {
                    *self.components.lock().expect("source components poisoned") = None;
                    *self.parse_error.lock().expect("source parse_error poisoned") = Some(err);
                }
            }
            *last_parse = Some(SystemTime::now());
        }
        Ok(())
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourceFile[{}]", self.path.display())
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for SourceFile {}

impl std::hash::Hash for SourceFile {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_header_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| HEADER_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
