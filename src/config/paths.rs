//! Configuration file discovery.

use std::path::{Path, PathBuf};

use crate::constants::{APP_NAME, CONFIG_FILENAME, CONFIG_PATH_ENV};
use crate::error::{Error, Result};

/// Returns the platform-specific configuration directory for modelgate.
///
/// Returns `~/.config/modelgate/` on Linux (`XDG_CONFIG_HOME/modelgate`).
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| Error::Configuration("could not determine config directory".into()))?
        .join(APP_NAME);
    Ok(dir)
}

/// Locates the configuration file.
///
/// Priority: explicit path > `MODELGATE_CONFIG` > nearest `config.yaml`
/// walking up to the git root > the XDG config directory.
pub fn find_config(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::Configuration(format!("cannot read current directory: {e}")))?;
    if let Some(path) = find_project_config(&cwd) {
        return Ok(path);
    }
    let global = config_dir()?.join(CONFIG_FILENAME);
    if global.exists() {
        return Ok(global);
    }
    Err(Error::Configuration(format!(
        "no {CONFIG_FILENAME} found (set {CONFIG_PATH_ENV} or pass --config)"
    )))
}

/// Looks for `config.yaml` in `start`, then walks up until a git root or the
/// filesystem root.
pub(crate) fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() || !dir.pop() {
            return None;
        }
    }
}
