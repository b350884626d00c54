//! Back-dating rebuild artifacts via `touch -c` (spec §4.F, §6 "Side
//! effects").

use std::path::Path;
use std::process::Command;

use crate::error::{ChangeEngineError, Result};

/// Runs `touch -c <path>`, updating the artifact's mtime to now without
/// creating it if absent, so `make` sees it as already up to date. Failure
/// to invoke this propagates immediately (spec §7).
pub fn avoid_build(path: &Path) -> Result<()> {
    let status = Command::new("touch")
        .arg("-c")
        .arg(path)
        .status()
        .map_err(|source| ChangeEngineError::Io { path: path.to_path_buf(), source })?;
    if !status.success() {
        return Err(ChangeEngineError::Touch {
            path: path.to_path_buf(),
            reason: format!("exited with {status}"),
        });
    }
    Ok(())
}
