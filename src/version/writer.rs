//! Version file rewrite.

use crate::error::{Result, VersionError};
use std::path::Path;

/// Assignment prefix of the single version line
pub const VERSION_FILE_PREFIX: &str = "__version__ = ";

/// Render the exact version file content (no trailing newline)
pub fn render_version_line(value: &str) -> String {
    format!("{VERSION_FILE_PREFIX}\"{value}\"")
}

/// Overwrite the version file with a single `__version__ = "<value>"` line.
///
/// Prior content is discarded. Parent directories are not created: the file
/// lives at a fixed location inside an existing tree.
pub fn write_version_file(path: &Path, value: &str) -> Result<()> {
    std::fs::write(path, render_version_line(value).as_bytes()).map_err(|e| {
        VersionError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    log::debug!("Wrote {} = {}", path.display(), value);
    Ok(())
}
