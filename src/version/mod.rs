//! Version strings, release modes and tag naming.
//!
//! Versions are dotted numeric strings (`2.0`, `2.0.1`, `1.2.3.4`). They are
//! not semver: the product has shipped two-component versions, so parsing
//! only requires non-empty numeric components.

mod writer;

pub use writer::{VERSION_FILE_PREFIX, render_version_line, write_version_file};

use crate::error::{Result, VersionError};
use std::fmt;

/// Version used for the paired old tag when the patch component is absent
pub const FALLBACK_OLD_VERSION: &str = "0.9.9";

/// Release pipeline variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Stable release, tag `v<version>`
    Stable,
    /// Beta release, tag `v<version>-beta`
    Beta,
    /// Beta release preceded by a synthetic older `-beta-old` release
    BetaPaired,
    /// Free-form feature push, version optional
    Special,
    /// Source-stripping release with history rewrite
    Secure,
}

impl ReleaseMode {
    /// Command-facing name of the mode
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseMode::Stable => "release",
            ReleaseMode::Beta => "release-beta",
            ReleaseMode::BetaPaired => "release-beta-old-pair",
            ReleaseMode::Special => "release-special",
            ReleaseMode::Secure => "secure-release",
        }
    }

    /// Commit message used when the operator gives none
    pub fn default_message(&self) -> &'static str {
        match self {
            ReleaseMode::Stable => "Stable release",
            ReleaseMode::Beta | ReleaseMode::BetaPaired => "Beta release",
            ReleaseMode::Special => "Update",
            ReleaseMode::Secure => "Compiled release",
        }
    }

    /// Whether the mode publishes on the beta channel
    pub fn is_beta(&self) -> bool {
        matches!(self, ReleaseMode::Beta | ReleaseMode::BetaPaired)
    }

    /// Whether a version must be supplied
    pub fn requires_version(&self) -> bool {
        !matches!(self, ReleaseMode::Special)
    }
}

impl fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated dotted numeric version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    raw: String,
    components: Vec<u64>,
}

impl ReleaseVersion {
    /// Parse a dotted numeric version, tolerating a leading `v`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);

        if raw.is_empty() {
            return Err(VersionError::InvalidVersion {
                version: input.to_string(),
                reason: "version is empty".to_string(),
            }
            .into());
        }

        let components = raw
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::InvalidVersion {
                        version: input.to_string(),
                        reason: format!("component '{part}' is not numeric"),
                    });
                }
                part.parse::<u64>().map_err(|e| VersionError::InvalidVersion {
                    version: input.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// Version text as given (without a leading `v`)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Derived older version for upgrade-path testing.
    ///
    /// Decrements the third component, floored at zero. Versions with fewer
    /// than three components map to [`FALLBACK_OLD_VERSION`].
    pub fn old_version(&self) -> String {
        if self.components.len() < 3 {
            return FALLBACK_OLD_VERSION.to_string();
        }
        let mut parts: Vec<String> = self.raw.split('.').map(str::to_string).collect();
        parts[2] = self.components[2].saturating_sub(1).to_string();
        parts.join(".")
    }

    /// `v<version>`
    pub fn stable_tag(&self) -> String {
        format!("v{}", self.raw)
    }

    /// `v<version>-beta`
    pub fn beta_tag(&self) -> String {
        format!("v{}-beta", self.raw)
    }

    /// `v<old>-beta-old`
    pub fn beta_old_tag(&self) -> String {
        format!("v{}-beta-old", self.old_version())
    }

    /// Value written to the version file for the paired old release
    pub fn beta_old_label(&self) -> String {
        format!("{}-beta-old", self.old_version())
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ReleaseVersion {
        ReleaseVersion::parse(s).expect("valid version")
    }

    #[test]
    fn test_old_version_decrements_patch() {
        assert_eq!(v("1.2.3").old_version(), "1.2.2");
        assert_eq!(v("2.0.10").old_version(), "2.0.9");
    }

    #[test]
    fn test_old_version_floors_at_zero() {
        assert_eq!(v("2.0.0").old_version(), "2.0.0");
    }

    #[test]
    fn test_old_version_keeps_extra_components() {
        assert_eq!(v("1.2.3.4").old_version(), "1.2.2.4");
    }

    #[test]
    fn test_old_version_fallback_for_short_versions() {
        assert_eq!(v("2.0").old_version(), FALLBACK_OLD_VERSION);
        assert_eq!(v("7").old_version(), FALLBACK_OLD_VERSION);
    }

    #[test]
    fn test_tag_names() {
        let version = v("1.2.3");
        assert_eq!(version.stable_tag(), "v1.2.3");
        assert_eq!(version.beta_tag(), "v1.2.3-beta");
        assert_eq!(version.beta_old_tag(), "v1.2.2-beta-old");
        assert_eq!(version.beta_old_label(), "1.2.2-beta-old");
    }

    #[test]
    fn test_leading_v_accepted() {
        assert_eq!(v("v2.0.1").as_str(), "2.0.1");
    }

    #[test]
    fn test_invalid_versions_rejected() {
        for input in ["", "1..2", "1.2.x", "beta", "1.2.3-rc1", " "] {
            assert!(ReleaseVersion::parse(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_mode_properties() {
        assert!(!ReleaseMode::Special.requires_version());
        assert!(ReleaseMode::Secure.requires_version());
        assert!(ReleaseMode::BetaPaired.is_beta());
        assert!(!ReleaseMode::Stable.is_beta());
        assert_eq!(ReleaseMode::BetaPaired.to_string(), "release-beta-old-pair");
    }
}
