//! `Target`: a build artifact (executable, static or shared library) and its
//! roll-up status over objects, library dependencies, and other inputs
//! (spec §3 "Target", §4.F "Target roll-up").

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use zen_cache::HashCache;

use crate::error::{ChangeEngineError, Result};
use crate::metadata::{self, TargetType};
use crate::object::CompileObject;
use crate::source_file::SourceFile;
use crate::status::Status;
use crate::touch;

/// One `CMakeFiles/<name>.dir/` target directory.
pub struct Target {
    name: String,
    dir: PathBuf,
    objects: Vec<CompileObject>,
    file_path: Option<PathBuf>,
    kind: TargetType,
    dependency_paths: HashSet<PathBuf>,
    status: Option<Status>,
}

impl Target {
    pub fn load(name: String, dir: PathBuf, build_dir: &Path) -> Result<Self> {
        let objects = metadata::parse_depend_internal(&dir.join("depend.internal"), build_dir)?
            .into_iter()
            .map(|obj| {
                let sources = obj.sources.into_iter().map(SourceFile::intern).collect();
                CompileObject::new(obj.object_path, sources)
            })
            .collect();

        let (file_path, kind) = metadata::identify_target(&dir.join("cmake_clean.cmake"), &dir)?;
        let dependency_paths = metadata::parse_build_make(&dir.join("build.make"), &name, build_dir)?;

        Ok(Self { name, dir, objects, file_path, kind, dependency_paths, status: None })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn kind(&self) -> TargetType {
        self.kind
    }

    pub fn objects(&self) -> &[CompileObject] {
        &self.objects
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Paths this target's build.make lists that are other targets'
    /// output files, resolved by library dependency paths (spec §4.F
    /// "library dependencies"). Any other dependency path is an "other"
    /// dependency (spec's `other_status`).
    pub fn library_dependency_paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.dependency_paths.iter().filter(|p| TargetType::from_path(p).is_lib()).map(PathBuf::as_path)
    }

    pub fn other_dependency_paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.dependency_paths
            .iter()
            .filter(|p| !TargetType::from_path(p).is_lib() && p.extension().and_then(|e| e.to_str()) != Some("o"))
            .map(PathBuf::as_path)
    }

    fn m_time(&self) -> Option<std::time::SystemTime> {
        let path = self.file_path.as_ref()?;
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// Non-object, non-library dependency modified after the target file
    /// (spec "other-status").
    fn other_status(&self) -> Result<Status> {
        let Some(own) = self.m_time() else {
            return Ok(Status::Changed);
        };
        for dep in self.other_dependency_paths() {
            let modified = std::fs::metadata(dep)
                .and_then(|m| m.modified())
                .map_err(|source| crate::error::ChangeEngineError::Io { path: dep.to_path_buf(), source })?;
            if modified > own {
                return Ok(Status::Changed);
            }
        }
        Ok(Status::NoChange)
    }

    /// Resolves this target's status, assuming every library dependency this
    /// target needs has already been meditated (library-first ordering is
    /// the caller's — [`crate::build_dir::BuildDir`] — responsibility).
    pub fn meditate(&mut self, cache: &HashCache, lib_statuses: &[Status]) -> Result<Status> {
        if let Some(status) = self.status {
            return Ok(status);
        }

        let max_lib_status = lib_statuses.iter().copied().max().unwrap_or(Status::NoChange);

        // A ParsingError for a single object downgrades only that object's
        // decision to CHANGED; any other error (I/O, cache) propagates to
        // the roll-up (spec §7 propagation policy).
        let mut max_obj_status = Status::NoChange;
        for object in &self.objects {
            let object_status = match object.meditate(cache) {
                Ok(status) => status,
                Err(ChangeEngineError::Parse(_)) => Status::Changed,
                Err(e) => return Err(e),
            };
            max_obj_status = max_obj_status.max(object_status);
        }

        let status = match self.m_time() {
            None => Status::Changed,
            Some(_) => {
                let other = self.other_status()?;
                max_obj_status.max(max_lib_status).max(other)
            }
        };

        if status == Status::MinorChange && self.kind != TargetType::Unknown {
            if let Some(path) = &self.file_path {
                debug!(target_name = %self.name, path = %path.display(), "minor change, back-dating target");
                touch::avoid_build(path)?;
            }
        }

        self.status = Some(status);
        Ok(status)
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Target[{}]", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use zen_cache::HashCache;

    fn write_target_dir(dir: &Path, object_rel: &str, source_abs: &Path, clean_name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("depend.internal"),
            format!("{object_rel}\n  {}\n", source_abs.display()),
        )
        .unwrap();
        fs::write(
            dir.join("cmake_clean.cmake"),
            format!("file(REMOVE_RECURSE\n  \"{object_rel}\"\n  \"{clean_name}\"\n)\n"),
        )
        .unwrap();
        fs::write(dir.join("build.make"), format!("app: {object_rel}\n")).unwrap();
    }

    #[test]
    fn missing_target_file_forces_changed() {
        SourceFile::clear();
        let build_dir = tempdir().unwrap();
        let src_path = build_dir.path().join("main.cc");
        fs::write(&src_path, "int main() { return 0; }\n").unwrap();
        let target_dir = build_dir.path().join("CMakeFiles/app.dir");
        write_target_dir(&target_dir, "CMakeFiles/app.dir/main.cc.o", &src_path, "app");

        let mut target = Target::load("app".to_string(), target_dir, build_dir.path()).unwrap();
        let cache = HashCache::load(build_dir.path()).unwrap();
        let status = target.meditate(&cache, &[]).unwrap();
        assert_eq!(status, Status::Changed);
    }

    #[test]
    fn meditate_is_idempotent_once_resolved() {
        SourceFile::clear();
        let build_dir = tempdir().unwrap();
        let src_path = build_dir.path().join("main.cc");
        fs::write(&src_path, "int main() { return 0; }\n").unwrap();
        let target_dir = build_dir.path().join("CMakeFiles/app.dir");
        write_target_dir(&target_dir, "CMakeFiles/app.dir/main.cc.o", &src_path, "app");

        let mut target = Target::load("app".to_string(), target_dir, build_dir.path()).unwrap();
        let cache = HashCache::load(build_dir.path()).unwrap();
        let first = target.meditate(&cache, &[]).unwrap();
        let second = target.meditate(&cache, &[]).unwrap();
        assert_eq!(first, second);
    }
}
