//! Ignore rules for the compiled-only repository.

use crate::config::SecureConfig;
use crate::error::{Result, SecureError};
use std::path::Path;

/// Ignore file written at the root of the reinitialized repository
pub const IGNORE_FILE: &str = ".gitignore";

/// Render ignore rules: sources and artifacts out, keep-list and binaries back in.
///
/// `extra_keep` names files kept on top of the configured keep list.
pub fn render_ignore_rules(
    config: &SecureConfig,
    extra_keep: &[String],
    backup_dir: &Path,
) -> String {
    let mut lines = vec!["# Sources are not published".to_string()];
    lines.extend(config.source_extensions.iter().map(|e| format!("*.{e}")));
    lines.extend(config.artifact_extensions.iter().map(|e| format!("*.{e}")));
    lines.push(String::new());
    lines.push("# Kept files and compiled modules".to_string());
    let mut kept: Vec<&String> = Vec::new();
    for name in config.keep_files.iter().chain(extra_keep) {
        if !kept.contains(&name) {
            kept.push(name);
        }
    }
    lines.extend(kept.into_iter().map(|f| format!("!{f}")));
    lines.extend(config.binary_extensions.iter().map(|e| format!("!*.{e}")));
    lines.push(String::new());
    lines.push("# Build output and local state".to_string());
    lines.extend(config.artifact_dirs.iter().map(|d| format!("{d}/")));
    lines.push(format!("{}/", backup_dir.display()));
    lines.push(String::new());
    lines.join("\n")
}

/// Write the ignore file into `root`
pub fn write_ignore_rules(
    root: &Path,
    config: &SecureConfig,
    extra_keep: &[String],
    backup_dir: &Path,
) -> Result<()> {
    let path = root.join(IGNORE_FILE);
    std::fs::write(&path, render_ignore_rules(config, extra_keep, backup_dir)).map_err(|e| {
        SecureError::WriteFailed {
            path,
            reason: e.to_string(),
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negations_follow_exclusions() {
        let rules = render_ignore_rules(&SecureConfig::default(), &[], Path::new("backup"));
        let lines: Vec<&str> = rules.lines().collect();
        let exclude = lines.iter().position(|l| *l == "*.py").expect("*.py");
        let keep = lines.iter().position(|l| *l == "!main.py").expect("!main.py");
        let binary = lines.iter().position(|l| *l == "!*.so").expect("!*.so");
        assert!(exclude < keep);
        assert!(exclude < binary);
        assert!(lines.contains(&"backup/"));
        assert!(lines.contains(&"__pycache__/"));
    }

    #[test]
    fn test_extra_keep_entries_are_reincluded_once() {
        let extra = vec!["app_version.py".to_string(), "main.py".to_string()];
        let rules = render_ignore_rules(&SecureConfig::default(), &extra, Path::new("backup"));
        let lines: Vec<&str> = rules.lines().collect();
        assert!(lines.contains(&"!app_version.py"));
        assert_eq!(lines.iter().filter(|l| **l == "!main.py").count(), 1);
    }
}
