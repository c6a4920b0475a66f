//! Command line argument parsing and validation.

use crate::version::ReleaseMode;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Release orchestrator for the GamesStore repository
#[derive(Parser, Debug)]
#[command(
    name = "gamesstore_release",
    version,
    about = "Release orchestrator for the GamesStore repository",
    long_about = "Write the version file, commit, tag and push a release, give the remote \
build workflow time to run, then restore any required file the round-trip removed.

Usage:
  gamesstore_release release 1.4.0 \"Inventory fixes\"
  gamesstore_release release-beta 1.5.0 --create-old-version
  gamesstore_release release-special \"Hotfix\" --tag-version 1.4.1
  gamesstore_release secure-release 2.0.0 --yes"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Repository root
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (defaults to gamesstore-release.toml in the root)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip the wait for the remote workflow
    #[arg(long, global = true)]
    pub no_wait: bool,

    /// Suppress console output (errors are still shown)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Options shared by every tagged release command
#[derive(ClapArgs, Debug, Clone)]
pub struct PublishOptions {
    /// Stage every change instead of only the required files
    #[arg(long)]
    pub all: bool,

    /// Dispatch the build workflow explicitly after tagging
    #[arg(long)]
    pub dispatch: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stable release tagged v<VERSION>
    Release {
        /// Version to release (e.g. 1.4.0)
        version: String,

        /// Release message
        message: Option<String>,

        /// Create a lightweight tag instead of an annotated one
        #[arg(long)]
        lightweight_tag: bool,

        #[command(flatten)]
        publish: PublishOptions,
    },

    /// Beta release tagged v<VERSION>-beta
    ReleaseBeta {
        /// Version to release (e.g. 1.5.0)
        version: String,

        /// Release message
        message: Option<String>,

        /// Publish a synthetic older beta first, for update testing
        #[arg(long)]
        create_old_version: bool,

        /// Reason recorded on the synthetic older beta
        #[arg(long, value_name = "REASON", requires = "create_old_version")]
        old_reason: Option<String>,

        #[command(flatten)]
        publish: PublishOptions,
    },

    /// Synthetic older beta followed by the real beta
    ReleaseBetaOldPair {
        /// Version to release (e.g. 1.5.0)
        version: String,

        /// Release message
        message: Option<String>,

        /// Reason recorded on the synthetic older beta
        #[arg(long, value_name = "REASON")]
        old_reason: Option<String>,

        #[command(flatten)]
        publish: PublishOptions,
    },

    /// Commit and push every change, optionally with a lightweight version tag
    ReleaseSpecial {
        /// Commit message
        message: Option<String>,

        /// Also write the version file and tag v<VERSION>
        #[arg(long, value_name = "VERSION")]
        tag_version: Option<String>,

        /// Dispatch the build workflow explicitly after tagging
        #[arg(long, requires = "tag_version")]
        dispatch: bool,
    },

    /// Build native modules, strip sources and publish with fresh history
    SecureRelease {
        /// Version to release (e.g. 2.0.0)
        version: String,

        /// Release message
        message: Option<String>,

        /// Confirm the destructive run without prompting
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

impl Command {
    /// Release mode of the command
    pub fn mode(&self) -> ReleaseMode {
        match self {
            Command::Release { .. } => ReleaseMode::Stable,
            Command::ReleaseBeta { .. } => ReleaseMode::Beta,
            Command::ReleaseBetaOldPair { .. } => ReleaseMode::BetaPaired,
            Command::ReleaseSpecial { .. } => ReleaseMode::Special,
            Command::SecureRelease { .. } => ReleaseMode::Secure,
        }
    }

    /// Subcommand name for error messages
    pub fn name(&self) -> &'static str {
        self.mode().name()
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let version = match &self.command {
            Command::Release { version, .. }
            | Command::ReleaseBeta { version, .. }
            | Command::ReleaseBetaOldPair { version, .. }
            | Command::SecureRelease { version, .. } => Some(version),
            Command::ReleaseSpecial { tag_version, .. } => tag_version.as_ref(),
        };
        if version.is_some_and(|v| v.trim().is_empty()) {
            return Err(format!("{} requires a non-empty version", self.command.name()));
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Configuration that prints nothing but errors
    pub fn quiet() -> Self {
        Self::new(true)
    }

    /// Print message
    pub fn println(&self, message: &str) {
        self.output.println(message);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        self.output.info(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_beta_with_old_version() {
        let args = Args::try_parse_from([
            "gamesstore_release",
            "release-beta",
            "1.2.3",
            "Beta notes",
            "--create-old-version",
            "--no-wait",
        ])
        .expect("parse");
        assert!(args.no_wait);
        match args.command {
            Command::ReleaseBeta {
                version,
                message,
                create_old_version,
                ..
            } => {
                assert_eq!(version, "1.2.3");
                assert_eq!(message.as_deref(), Some("Beta notes"));
                assert!(create_old_version);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_special_without_version() {
        let args = Args::try_parse_from(["gamesstore_release", "release-special", "Hotfix"])
            .expect("parse");
        assert_eq!(args.command.mode(), ReleaseMode::Special);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_release_requires_version() {
        assert!(Args::try_parse_from(["gamesstore_release", "release"]).is_err());
        let args = Args::try_parse_from(["gamesstore_release", "release", " "]).expect("parse");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "gamesstore_release",
            "secure-release",
            "2.0.0",
            "--yes",
            "--root",
            "/tmp/tree",
        ])
        .expect("parse");
        assert_eq!(args.root, PathBuf::from("/tmp/tree"));
        assert_eq!(args.command.name(), "secure-release");
    }
}
