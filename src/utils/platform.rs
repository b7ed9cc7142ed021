//! Platform helpers for locating external tools and expanding user paths.

use anyhow::Result;
use std::path::PathBuf;

use crate::core::DebforgeError;

/// Name of the git executable on this platform.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if cfg!(windows) { "git.exe" } else { "git" }
}

/// Whether `cmd` resolves to an executable in PATH.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Fail with [`DebforgeError::ToolNotFound`] unless `cmd` is in PATH.
pub fn ensure_command(cmd: &str) -> Result<()> {
    if command_exists(cmd) {
        Ok(())
    } else {
        Err(DebforgeError::ToolNotFound {
            tool: cmd.to_string(),
        }
        .into())
    }
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).map_err(|e| DebforgeError::ConfigError {
        message: format!("Failed to expand path '{path}': {e}"),
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
