use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};

// TODO: What are the executable names on Windows? macOS?
const EXECUTABLES: [&str; 4] = ["google-chrome", "chromium", "chromium-browser", "chrome"];

/// Locate a Chrome/Chromium executable that can be driven over CDP.
///
/// An explicitly configured executable (a path, or a name to look up on
/// `PATH`) is used as-is when it resolves; otherwise the usual executable
/// names are searched for on `PATH`.
pub(crate) fn discover(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(configured) = configured {
        if let Ok(path) = which::which(configured) {
            return Ok(path);
        }
        tracing::warn!(executable = %configured.display(), "Configured browser executable not found");
        exn::bail!(ErrorKind::ChromeNotFound);
    }
    for exe in EXECUTABLES {
        if let Ok(path) = which::which(exe) {
            tracing::trace!(executable = %path.display(), "Discovered browser executable on PATH");
            return Ok(path);
        }
    }
    tracing::info!("Chrome executable not found in PATH");
    exn::bail!(ErrorKind::ChromeNotFound);
}
