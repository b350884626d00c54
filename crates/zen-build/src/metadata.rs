//! Parsing for the three CMake-generated files a target directory exposes
//! (spec §6 "Build-system metadata").

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ChangeEngineError, Result};

/// What kind of artifact a target produces, identified from its output file
/// extension (spec §6, §3 "Target").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Executable,
    StaticLib,
    SharedLib,
    Unknown,
}

const LIB_TYPES: [TargetType; 2] = [TargetType::StaticLib, TargetType::SharedLib];

impl TargetType {
    pub fn is_lib(self) -> bool {
        LIB_TYPES.contains(&self)
    }

    /// Classifies a path by its extension: no extension is an executable,
    /// `.a` a static library, `.so` a shared library, anything else unknown
    /// (spec §6 "its extension determines type").
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            None => TargetType::Executable,
            Some("a") => TargetType::StaticLib,
            Some("so") => TargetType::SharedLib,
            Some(_) => TargetType::Unknown,
        }
    }
}

/// One `.o` object's recorded dependency list, as found in `depend.internal`.
pub struct ObjectDependencies {
    pub object_path: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// Parses `depend.internal`: object lines end with `.o`; indented
/// continuation lines name source dependencies, resolved relative to
/// `build_dir` (spec §6).
///
/// Returns an empty list if the file does not exist — a target with no
/// recorded objects yet is not an error (spec §7: missing metadata implies
/// "nothing built yet", handled by the caller as CHANGED via a missing
/// object file rather than here).
pub fn parse_depend_internal(path: &Path, build_dir: &Path) -> Result<Vec<ObjectDependencies>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)
        .map_err(|source| ChangeEngineError::Io { path: path.to_path_buf(), source })?;

    let mut objects = Vec::new();
    let mut object_path: Option<PathBuf> = None;
    let mut sources: Vec<PathBuf> = Vec::new();

    for line in text.lines() {
        let trimmed_end = line.trim_end();
        if object_path.is_some() && !trimmed_end.is_empty() && trimmed_end.starts_with(' ') {
            sources.push(PathBuf::from(trimmed_end.trim()));
        }
        if trimmed_end.ends_with(".o") {
            if let Some(current) = object_path.take() {
                objects.push(ObjectDependencies { object_path: current, sources: std::mem::take(&mut sources) });
            }
            object_path = Some(build_dir.join(trimmed_end.trim()));
        }
    }
    if let Some(current) = object_path {
        objects.push(ObjectDependencies { object_path: current, sources });
    }
    Ok(objects)
}

/// Reads `cmake_clean.cmake`'s `file(REMOVE_RECURSE …)` block and returns the
/// last quoted entry — the target's output file name — together with its
/// type (spec §6).
///
/// Returns `(None, Unknown)` if the marker is absent, matching the upstream
/// behavior of refusing to guess a path when the type can't be determined.
pub fn identify_target(clean_cmake_path: &Path, target_dir: &Path) -> Result<(Option<PathBuf>, TargetType)> {
    let text = fs::read_to_string(clean_cmake_path)
        .map_err(|source| ChangeEngineError::Io { path: clean_cmake_path.to_path_buf(), source })?;

    const START_KEY: &str = "file(REMOVE_RECURSE";
    let Some(start) = text.find(START_KEY) else {
        return Ok((None, TargetType::Unknown));
    };
    let start = start + START_KEY.len();
    let Some(end_rel) = text[start..].find("\n)\n") else {
        return Err(ChangeEngineError::CmakeMetadata {
            path: clean_cmake_path.to_path_buf(),
            reason: "unterminated file(REMOVE_RECURSE ...) block".to_string(),
        });
    };
    let body = &text[start..start + end_rel];
    let last_line = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| ChangeEngineError::CmakeMetadata {
            path: clean_cmake_path.to_path_buf(),
            reason: "empty file(REMOVE_RECURSE ...) block".to_string(),
        })?;
    let target_name = last_line
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| ChangeEngineError::CmakeMetadata {
            path: clean_cmake_path.to_path_buf(),
            reason: format!("expected quoted target name, found {last_line:?}"),
        })?;

    let target_type = TargetType::from_path(Path::new(target_name));
    if target_type == TargetType::Unknown {
        return Ok((None, TargetType::Unknown));
    }
    let path = target_dir
        .join("..")
        .join("..")
        .join(target_name);
    Ok((Some(normalize(&path)), target_type))
}

/// Collapses `.`/`..` components lexically, without touching the
/// filesystem — the resolved target file may not exist yet on a first
/// build, so [`fs::canonicalize`] (which requires the path to exist) would
/// reject exactly the case this function needs to handle.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

/// Parses `build.make`: lines beginning with `<target_name>:` list dependency
/// file paths relative to `build_dir` (spec §6).
pub fn parse_build_make(path: &Path, target_name: &str, build_dir: &Path) -> Result<HashSet<PathBuf>> {
    let text = fs::read_to_string(path)
        .map_err(|source| ChangeEngineError::Io { path: path.to_path_buf(), source })?;
    let prefix = format!("{target_name}:");
    let mut paths = HashSet::new();
    for line in text.lines() {
        if let Some(rel) = line.strip_prefix(&prefix) {
            paths.insert(build_dir.join(rel.trim()));
        }
    }
    Ok(paths)
}
