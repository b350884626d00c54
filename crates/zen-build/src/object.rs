//! `CompileObject`: one `.o` artifact and its per-object change decision
//! (spec §3 "CompileObject", §4.F steps 1-3, 5).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;
use zen_cache::HashCache;
use zen_graph::ConstructGraph;

use crate::error::Result;
use crate::source_file::SourceFile;
use crate::status::Status;

pub struct CompileObject {
    path: PathBuf,
    sources: Vec<Arc<SourceFile>>,
}

impl CompileObject {
    pub fn new(path: PathBuf, sources: Vec<Arc<SourceFile>>) -> Self {
        Self { path, sources }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sources(&self) -> &[Arc<SourceFile>] {
        &self.sources
    }

    fn m_time(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// Step 1: any source newer than the object, or the object missing.
    fn sources_modified(&self) -> Result<bool> {
        let Some(own) = self.m_time() else {
            return Ok(true);
        };
        for source in &self.sources {
            if own <= source.m_time()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Step 2: any source whose `stripped_hash` differs from the cache
    /// (a missing cache entry counts as "differs").
    fn has_code_changes(&self, cache: &HashCache) -> Result<bool> {
        for source in &self.sources {
            let key = source.hex();
            let current = source.stripped_hash()?;
            if !cache.matches(&key, current) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Step 3: builds the object's `ConstructGraph` over every non-header
    /// source's components, then returns true if either (a) a non-header
    /// source itself shows a substantive (`stripped_hash`) change — it is
    /// the translation unit actually compiled, so its own edits always
    /// count, unlike a shared header's — or (b) any construct used by any
    /// component in a non-header source has itself changed, directly or
    /// through its recursive dependencies (spec §4.F step 3).
    fn has_used_content_change(&self, cache: &HashCache) -> Result<bool> {
        for source in &self.sources {
            if source.is_header() {
                continue;
            }
            if !cache.matches(&source.hex(), source.stripped_hash()?) {
                return Ok(true);
            }
        }

        let mut guards = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            guards.push(source.components_guard()?);
        }
        let all_components: Vec<&zen_parse::Component> = guards
            .iter()
            .flat_map(|g| g.as_deref().expect("just parsed").iter())
            .collect();
        let graph = ConstructGraph::from_components(all_components);

        let changed_constructs = self.changed_construct_names(&graph, cache);

        // Operator overloads are always considered used: their call sites
        // (`a + b`) never literally mention `operator+`, so a changed
        // operator forces the object's decision regardless of whether any
        // component's tokens appear to reference it (spec §9).
        if graph.iter().any(|(name, c)| c.is_operator() && changed_constructs.contains(name)) {
            return Ok(true);
        }

        for (non_header_idx, source) in self.sources.iter().enumerate() {
            if source.is_header() {
                continue;
            }
            let components = guards[non_header_idx].as_deref().expect("just parsed");
            for component in components {
                let used = component.used_construct_names(&graph.names());
                if used.iter().any(|name| changed_constructs.contains(name)) {
                    return Ok(true);
                }
                for nested in component.recursive_components() {
                    let used = nested.used_construct_names(&graph.names());
                    if used.iter().any(|name| changed_constructs.contains(name)) {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    /// A construct is changed if its own `content_hash` differs from the
    /// cache (missing ⇒ changed) or any construct in its recursive
    /// dependency closure is changed.
    fn changed_construct_names(&self, graph: &ConstructGraph<'_>, cache: &HashCache) -> std::collections::HashSet<String> {
        let mut changed = std::collections::HashSet::new();
        for (name, construct) in graph.iter() {
            let key = zen_cache::construct_key(&self.path, name);
            if !cache.matches(&key, construct.content_hash()) {
                changed.insert(name.clone());
            }
        }
        let mut grew = true;
        while grew {
            grew = false;
            let names: Vec<String> = graph.names().into_iter().collect();
            for name in names {
                if changed.contains(&name) {
                    continue;
                }
                if graph.recursive_dependencies(&name).iter().any(|dep| changed.contains(dep)) {
                    changed.insert(name);
                    grew = true;
                }
            }
        }
        changed
    }

    /// Runs the five-step decision procedure, returning the resolved
    /// status. A parsing error surfaced anywhere in steps 2-3 is caught by
    /// the caller and downgraded to [`Status::Changed`] (spec §4.F step 5,
    /// §7 propagation policy) rather than here, so `meditate` itself can
    /// propagate the error for that conservative handling to apply.
    pub fn meditate(&self, cache: &HashCache) -> Result<Status> {
        if !self.sources_modified()? {
            debug!(object = %self.path.display(), "sources unmodified, no change");
            return Ok(Status::NoChange);
        }
        debug!(object = %self.path.display(), "sources modified, checking substance");

        let code_changed = self.has_code_changes(cache)?;
        let used_content_changed = self.has_used_content_change(cache)?;

        if code_changed && used_content_changed {
            Ok(Status::Changed)
        } else {
            debug!(object = %self.path.display(), "only cosmetic changes, back-dating");
            crate::touch::avoid_build(&self.path)?;
            Ok(Status::MinorChange)
        }
    }
}

impl std::fmt::Debug for CompileObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompileObject[{}]", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch_future(path: &Path) {
        let now = filetime::FileTime::from_system_time(SystemTime::now() + Duration::from_secs(5));
        filetime::set_file_mtime(path, now).unwrap();
    }

    #[test]
    fn no_change_when_object_is_newer_than_sources() {
        SourceFile::clear();
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("a.cc");
        fs::write(&src_path, "void a() {}\n").unwrap();
        let obj_path = dir.path().join("a.o");
        fs::write(&obj_path, b"object").unwrap();
        touch_future(&obj_path);

        let source = SourceFile::intern(&src_path);
        let object = CompileObject::new(obj_path, vec![source]);
        let cache = HashCache::load(dir.path()).unwrap();

        assert_eq!(object.meditate(&cache).unwrap(), Status::NoChange);
    }

    #[test]
    fn missing_cache_entries_force_changed() {
        SourceFile::clear();
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("a.cc");
        fs::write(&src_path, "void a() {}\n").unwrap();
        let obj_path = dir.path().join("a.o");
        fs::write(&obj_path, b"object").unwrap();

        let source = SourceFile::intern(&src_path);
        let object = CompileObject::new(obj_path, vec![source]);
        let cache = HashCache::load(dir.path()).unwrap();

        assert_eq!(object.meditate(&cache).unwrap(), Status::Changed);
    }

    #[test]
    fn whitespace_only_edit_is_a_minor_change() {
        SourceFile::clear();
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("a.cc");
        fs::write(&src_path, "void a() {}\n").unwrap();
        let obj_path = dir.path().join("a.o");
        fs::write(&obj_path, b"object").unwrap();

        let mut cache = HashCache::load(dir.path()).unwrap();
        {
            let source = SourceFile::intern(&src_path);
            cache.set(source.hex(), source.stripped_hash().unwrap());
            source
                .with_components(|components| {
                    let graph = ConstructGraph::from_components(components.iter());
                    for (name, construct) in graph.iter() {
                        cache.set(zen_cache::construct_key(&obj_path, name), construct.content_hash());
                    }
                })
                .unwrap();
        }

        std::thread::sleep(Duration::from_millis(10));
        fs::write(&src_path, "void   a()   {}\n").unwrap();
        filetime::set_file_mtime(&src_path, filetime::FileTime::now()).unwrap();

        let object = CompileObject::new(obj_path, vec![SourceFile::intern(&src_path)]);
        assert_eq!(object.meditate(&cache).unwrap(), Status::MinorChange);
    }

    #[test]
    fn structurally_broken_source_surfaces_a_parse_error() {
        SourceFile::clear();
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("a.cc");
        fs::write(&src_path, "void outer() { void inner() { } }\n").unwrap();
        let obj_path = dir.path().join("a.o");
        fs::write(&obj_path, b"object").unwrap();

        let source = SourceFile::intern(&src_path);
        // Step 2's textual comparison still succeeds on a malformed file.
        let stripped = source.stripped_hash().unwrap();

        // Pre-populate the cache so step 2's own check doesn't short-circuit
        // `has_used_content_change` before it reaches the construct-graph
        // walk that needs the (failing) structural parse.
        let mut cache = HashCache::load(dir.path()).unwrap();
        cache.set(source.hex(), stripped);

        let object = CompileObject::new(obj_path, vec![source]);
        let err = object.meditate(&cache).unwrap_err();
        assert!(matches!(err, crate::error::ChangeEngineError::Parse(_)));
    }
}
