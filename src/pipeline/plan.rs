//! What a release run will commit and tag, decided before anything runs.

use crate::error::{Result, VersionError};
use crate::version::{ReleaseMode, ReleaseVersion};

/// Reason recorded on the synthetic older release
pub const DEFAULT_OLD_REASON: &str = "synthetic older release for update testing";

/// Annotated or lightweight tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStyle {
    /// Tag object carrying the commit message
    Annotated,
    /// Plain ref
    Lightweight,
}

/// How a ref is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    /// Regular push
    Plain,
    /// Overwrite the remote ref
    Force,
}

impl PushMode {
    /// Whether the push is forced
    pub fn is_forced(self) -> bool {
        matches!(self, PushMode::Force)
    }
}

/// A tag to create after a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    /// Tag name
    pub name: String,
    /// Tag style
    pub style: TagStyle,
    /// Tag push mode
    pub push: PushMode,
}

/// One commit of a release run, with its optional tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    /// Value written to the version file before the commit
    pub file_version: Option<String>,
    /// Commit message
    pub message: String,
    /// Tag to create on the commit
    pub tag: Option<TagSpec>,
}

/// A parsed and validated release invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Release mode
    pub mode: ReleaseMode,
    /// Version, absent only for version-less special releases
    pub version: Option<ReleaseVersion>,
    /// Free-text release message
    pub message: String,
    /// Stage every change instead of only the required files
    pub commit_all: bool,
    /// Beta only: publish a synthetic older release first
    pub create_old_version: bool,
    /// Reason recorded on the synthetic older release
    pub old_reason: String,
    /// Stable only: create a lightweight tag
    pub lightweight_tag: bool,
    /// Explicitly dispatch the build workflow after tagging
    pub dispatch: bool,
}

impl ReleaseRequest {
    /// Validate the version for `mode` and fill in the default message
    pub fn new(mode: ReleaseMode, version: Option<&str>, message: Option<&str>) -> Result<Self> {
        let version = match version.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => Some(ReleaseVersion::parse(raw)?),
            None if mode.requires_version() => {
                return Err(VersionError::Missing {
                    mode: mode.name().to_string(),
                }
                .into());
            }
            None => None,
        };
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(mode.default_message())
            .to_string();

        Ok(Self {
            mode,
            version,
            message,
            commit_all: matches!(mode, ReleaseMode::Special),
            create_old_version: false,
            old_reason: DEFAULT_OLD_REASON.to_string(),
            lightweight_tag: false,
            dispatch: false,
        })
    }

    /// Stage every change
    pub fn with_commit_all(mut self, commit_all: bool) -> Self {
        self.commit_all = self.commit_all || commit_all;
        self
    }

    /// Publish a synthetic older beta first
    pub fn with_create_old_version(mut self, create: bool) -> Self {
        self.create_old_version = create;
        self
    }

    /// Reason recorded on the synthetic older beta
    pub fn with_old_reason(mut self, reason: Option<&str>) -> Self {
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            self.old_reason = reason.to_string();
        }
        self
    }

    /// Use a lightweight stable tag
    pub fn with_lightweight_tag(mut self, lightweight: bool) -> Self {
        self.lightweight_tag = lightweight;
        self
    }

    /// Dispatch the build workflow explicitly
    pub fn with_dispatch(mut self, dispatch: bool) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Whether a synthetic older beta precedes the real one
    pub fn is_paired(&self) -> bool {
        match self.mode {
            ReleaseMode::BetaPaired => true,
            ReleaseMode::Beta => self.create_old_version,
            _ => false,
        }
    }

    /// Commits and tags of the run, in execution order
    pub fn plan(&self) -> Vec<CommitPlan> {
        let Some(version) = &self.version else {
            return vec![CommitPlan {
                file_version: None,
                message: format!("feat: {}", self.message),
                tag: None,
            }];
        };

        match self.mode {
            ReleaseMode::Stable => {
                let tag = version.stable_tag();
                vec![CommitPlan {
                    file_version: Some(version.to_string()),
                    message: format!("{} - {}", tag, self.message),
                    tag: Some(TagSpec {
                        name: tag,
                        style: if self.lightweight_tag {
                            TagStyle::Lightweight
                        } else {
                            TagStyle::Annotated
                        },
                        push: PushMode::Plain,
                    }),
                }]
            }
            ReleaseMode::Beta | ReleaseMode::BetaPaired => {
                let mut plans = Vec::with_capacity(2);
                if self.is_paired() {
                    let old_tag = version.beta_old_tag();
                    plans.push(CommitPlan {
                        file_version: Some(version.beta_old_label()),
                        message: format!("beta-old: {} - {}", old_tag, self.old_reason),
                        tag: Some(TagSpec {
                            name: old_tag,
                            style: TagStyle::Annotated,
                            push: PushMode::Force,
                        }),
                    });
                }
                let tag = version.beta_tag();
                plans.push(CommitPlan {
                    file_version: Some(version.to_string()),
                    message: format!("beta: {} - {}", tag, self.message),
                    tag: Some(TagSpec {
                        name: tag,
                        style: TagStyle::Annotated,
                        push: PushMode::Force,
                    }),
                });
                plans
            }
            ReleaseMode::Special => vec![CommitPlan {
                file_version: Some(version.to_string()),
                message: format!("feat: {}", self.message),
                tag: Some(TagSpec {
                    name: version.stable_tag(),
                    style: TagStyle::Lightweight,
                    push: PushMode::Plain,
                }),
            }],
            ReleaseMode::Secure => {
                let tag = version.stable_tag();
                vec![CommitPlan {
                    file_version: Some(version.to_string()),
                    message: format!("{} - {} (Secure Build)", tag, self.message),
                    tag: Some(TagSpec {
                        name: tag,
                        style: TagStyle::Annotated,
                        push: PushMode::Force,
                    }),
                }]
            }
        }
    }

    /// Whether any commit of the run is tagged
    pub fn creates_tags(&self) -> bool {
        self.plan().iter().any(|p| p.tag.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(plans: &[CommitPlan]) -> Vec<&str> {
        plans
            .iter()
            .filter_map(|p| p.tag.as_ref().map(|t| t.name.as_str()))
            .collect()
    }

    #[test]
    fn test_stable_plan() {
        let request = ReleaseRequest::new(ReleaseMode::Stable, Some("1.2.3"), None).expect("valid");
        let plans = request.plan();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].file_version.as_deref(), Some("1.2.3"));
        assert_eq!(plans[0].message, "v1.2.3 - Stable release");
        let tag = plans[0].tag.as_ref().expect("tag");
        assert_eq!(tag.style, TagStyle::Annotated);
        assert_eq!(tag.push, PushMode::Plain);
    }

    #[test]
    fn test_lightweight_stable_tag() {
        let request = ReleaseRequest::new(ReleaseMode::Stable, Some("1.2.3"), Some("x"))
            .expect("valid")
            .with_lightweight_tag(true);
        let plans = request.plan();
        assert_eq!(plans[0].tag.as_ref().map(|t| t.style), Some(TagStyle::Lightweight));
    }

    #[test]
    fn test_beta_plan_force_pushes() {
        let request =
            ReleaseRequest::new(ReleaseMode::Beta, Some("2.0.0"), Some("Try it")).expect("valid");
        let plans = request.plan();
        assert_eq!(tags(&plans), vec!["v2.0.0-beta"]);
        assert_eq!(plans[0].message, "beta: v2.0.0-beta - Try it");
        assert!(plans[0].tag.as_ref().is_some_and(|t| t.push.is_forced()));
    }

    #[test]
    fn test_paired_plan_orders_old_first() {
        let request = ReleaseRequest::new(ReleaseMode::BetaPaired, Some("1.2.3"), Some("New"))
            .expect("valid");
        let plans = request.plan();
        assert_eq!(tags(&plans), vec!["v1.2.2-beta-old", "v1.2.3-beta"]);
        assert_eq!(plans[0].file_version.as_deref(), Some("1.2.2-beta-old"));
        assert_eq!(
            plans[0].message,
            format!("beta-old: v1.2.2-beta-old - {DEFAULT_OLD_REASON}")
        );
        assert_eq!(plans[1].file_version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_beta_with_create_old_version_is_paired() {
        let request = ReleaseRequest::new(ReleaseMode::Beta, Some("1.0.0"), None)
            .expect("valid")
            .with_create_old_version(true)
            .with_old_reason(Some("regression check"));
        assert!(request.is_paired());
        let plans = request.plan();
        assert_eq!(tags(&plans), vec!["v1.0.0-beta-old", "v1.0.0-beta"]);
        assert_eq!(plans[0].message, "beta-old: v1.0.0-beta-old - regression check");
    }

    #[test]
    fn test_special_without_version_commits_only() {
        let request =
            ReleaseRequest::new(ReleaseMode::Special, None, Some("hotfix")).expect("valid");
        assert!(request.commit_all);
        assert!(!request.creates_tags());
        let plans = request.plan();
        assert_eq!(plans[0].message, "feat: hotfix");
        assert!(plans[0].file_version.is_none());
    }

    #[test]
    fn test_special_with_version_uses_lightweight_tag() {
        let request =
            ReleaseRequest::new(ReleaseMode::Special, Some("3.1.0"), None).expect("valid");
        let plans = request.plan();
        let tag = plans[0].tag.as_ref().expect("tag");
        assert_eq!(tag.name, "v3.1.0");
        assert_eq!(tag.style, TagStyle::Lightweight);
        assert_eq!(tag.push, PushMode::Plain);
        assert_eq!(plans[0].message, "feat: Update");
    }

    #[test]
    fn test_secure_commit_message() {
        let request =
            ReleaseRequest::new(ReleaseMode::Secure, Some("4.0.0"), Some("Ship")).expect("valid");
        assert_eq!(request.plan()[0].message, "v4.0.0 - Ship (Secure Build)");
    }

    #[test]
    fn test_missing_version_rejected() {
        assert!(ReleaseRequest::new(ReleaseMode::Stable, None, None).is_err());
        assert!(ReleaseRequest::new(ReleaseMode::Beta, Some("  "), None).is_err());
    }

    #[test]
    fn test_invalid_version_rejected() {
        assert!(ReleaseRequest::new(ReleaseMode::Stable, Some("1.2.3-rc1"), None).is_err());
    }
}
