//! `BuildDir`: root of one analysis, owning every discovered `Target` and
//! the persistent hash cache (spec §3 "BuildDir", §4.F, §4.G, §6).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use walkdir::WalkDir;
use zen_cache::HashCache;
use zen_graph::ConstructGraph;

use crate::error::{ChangeEngineError, Result};
use crate::source_file::SourceFile;
use crate::status::Status;
use crate::target::Target;

pub struct BuildDir {
    path: PathBuf,
    targets: HashMap<String, Target>,
    targets_by_path: HashMap<PathBuf, String>,
    cache: HashCache,
}

impl BuildDir {
    /// Discovers every `CMakeFiles/<name>.dir` target directory under
    /// `path` and loads the persistent cache at `<path>/zen_cache` (spec
    /// §6 "Build-system metadata", §4.G).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut targets = HashMap::new();
        for entry in WalkDir::new(&path).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(dir_name) = entry.file_name().to_str() else { continue };
            let Some(name) = dir_name.strip_suffix(".dir") else { continue };
            if targets.contains_key(name) {
                return Err(ChangeEngineError::CmakeMetadata {
                    path: entry.path().to_path_buf(),
                    reason: format!("multiple targets named {name}"),
                });
            }
            let target = Target::load(name.to_string(), entry.path().to_path_buf(), &path)?;
            targets.insert(name.to_string(), target);
        }

        let mut targets_by_path = HashMap::new();
        for (name, target) in &targets {
            if let Some(file_path) = target.file_path() {
                targets_by_path.insert(file_path.to_path_buf(), name.clone());
            }
        }

        let cache = HashCache::load(&path)?;
        Ok(Self { path, targets, targets_by_path, cache })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// All sources referenced by any target's objects (spec's
    /// `BuildDir.sources`, used by `remember`).
    pub fn sources(&self) -> HashSet<Arc<SourceFile>> {
        let mut all = HashSet::new();
        for target in self.targets.values() {
            for object in target.objects() {
                all.extend(object.sources().iter().cloned());
            }
        }
        all
    }

    /// Runs the change engine over every target, library dependencies
    /// first, so a dependent's roll-up sees its libraries' resolved
    /// statuses (spec §5 "Ordering guarantees").
    pub fn meditate(&mut self) -> Result<()> {
        let names: Vec<String> = self.targets.keys().cloned().collect();
        for name in names {
            self.meditate_target(&name)?;
        }
        Ok(())
    }

    fn meditate_target(&mut self, name: &str) -> Result<Status> {
        if let Some(status) = self.targets.get(name).and_then(Target::status) {
            return Ok(status);
        }

        let lib_paths: Vec<PathBuf> =
            self.targets[name].library_dependency_paths().map(Path::to_path_buf).collect();

        let mut lib_statuses = Vec::with_capacity(lib_paths.len());
        for lib_path in &lib_paths {
            let lib_name = self
                .targets_by_path
                .get(lib_path)
                .ok_or_else(|| ChangeEngineError::UnresolvedLibDependency(lib_path.clone()))?
                .clone();
            lib_statuses.push(self.meditate_target(&lib_name)?);
        }

        info!(target_name = name, "meditating");
        let status = self.targets.get_mut(name).expect("target exists").meditate(&self.cache, &lib_statuses)?;
        info!(target_name = name, ?status, "resolved");
        Ok(status)
    }

    /// Records current fingerprints for every source and every object's
    /// constructs, after a successful build (spec §4.G "Remember phase").
    /// Failures computing a single object's constructs are tolerated so a
    /// malformed source never blocks recording good data for the rest
    /// (spec §7).
    pub fn remember(&mut self) -> Result<()> {
        for source in self.sources() {
            match source.stripped_hash() {
                Ok(hash) => self.cache.set(source.hex(), hash),
                Err(_) => continue,
            }
        }

        for target in self.targets.values() {
            for object in target.objects() {
                let mut guards = Vec::with_capacity(object.sources().len());
                let mut failed = false;
                for source in object.sources() {
                    match source.components_guard() {
                        Ok(guard) => guards.push(guard),
                        Err(_) => {
                            failed = true;
                            break;
                        }
                    }
                }
                if failed {
                    continue;
                }
                let all_components: Vec<&zen_parse::Component> =
                    guards.iter().flat_map(|g| g.as_deref().expect("just parsed").iter()).collect();
                let graph = ConstructGraph::from_components(all_components);
                for (construct_name, construct) in graph.iter() {
                    self.cache.set(zen_cache::construct_key(object.path(), construct_name), construct.content_hash());
                }
            }
        }

        self.cache.save()?;
        Ok(())
    }
}

impl std::fmt::Debug for BuildDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BuildDir[{}]", self.path.display())
    }
}
