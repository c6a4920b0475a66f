//! Error types for release orchestration.
//!
//! Every failure carries enough context to tell the operator what to do next.
//! Whether a failure stops the run is decided by the pipeline's step table,
//! not by the error itself.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Required files check failed
    #[error("Preflight error: {0}")]
    Preflight(#[from] PreflightError),

    /// Version parsing or version file errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Backup and restore errors
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Remote workflow dispatch errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Secure build errors
    #[error("Secure build error: {0}")]
    Secure(#[from] SecureError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Preflight errors
#[derive(Error, Debug)]
pub enum PreflightError {
    /// One or more required entries are absent
    #[error("Missing required entries: {}", display_paths(.missing))]
    MissingEntries {
        /// Entries that were not found (relative to the tree root)
        missing: Vec<PathBuf>,
    },

    /// Tree root does not exist
    #[error("Release root not found: {path}")]
    RootNotFound {
        /// Path that was expected to be the tree root
        path: PathBuf,
    },
}

/// Version errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version missing for a mode that requires one
    #[error("A version is required for '{mode}' releases")]
    Missing {
        /// Release mode name
        mode: String,
    },

    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Failed to write the version file
    #[error("Failed to write version file {path}: {reason}")]
    WriteFailed {
        /// Path to the version file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Backup and restore errors
#[derive(Error, Debug)]
pub enum BackupError {
    /// Could not create the backup directory
    #[error("Failed to create backup directory {path}: {reason}")]
    CreateDirFailed {
        /// Backup directory
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Could not copy a file into the backup directory
    #[error("Failed to back up {source_path} to {backup_path}: {reason}")]
    CopyFailed {
        /// File being backed up
        source_path: PathBuf,
        /// Destination backup file
        backup_path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Could not restore a file from a backup
    #[error("Failed to restore {target} from {backup_path}: {reason}")]
    RestoreFailed {
        /// File being restored
        target: PathBuf,
        /// Backup used as the source
        backup_path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Two files in one run would share a backup name
    #[error("{first} and {second} would share the backup name {name}")]
    DuplicateName {
        /// File backed up first
        first: PathBuf,
        /// File that would overwrite its backup
        second: PathBuf,
        /// Shared file name
        name: String,
    },

    /// Invalid search pattern for backup lookup
    #[error("Invalid backup pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Glob pattern
        pattern: String,
        /// Reason for the error
        reason: String,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository. Please initialize git first.")]
    NotRepository,

    /// Git binary could not be started
    #[error("Failed to run git {command}: {reason}")]
    SpawnFailed {
        /// Git subcommand line
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Git exited with a non-zero status
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// Git subcommand line
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// Nothing staged to commit
    #[error("Nothing to commit")]
    NothingToCommit,

    /// Remote not configured
    #[error("Remote '{remote}' is not configured")]
    RemoteNotFound {
        /// Remote name
        remote: String,
    },
}

/// Remote workflow errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// `gh` CLI call failed
    #[error("gh workflow run failed: {reason}")]
    CliFailed {
        /// Reason for the error
        reason: String,
    },

    /// API request failed at transport level
    #[error("Workflow dispatch request failed: {reason}")]
    RequestFailed {
        /// Reason for the error
        reason: String,
    },

    /// API answered with a non-success status
    #[error("Workflow dispatch rejected with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Hosting repository could not be determined
    #[error("Could not determine the GitHub repository: {reason}")]
    UnknownRepository {
        /// Reason for the error
        reason: String,
    },

    /// Polling gave up before the workflow reported completion
    #[error("Remote workflow did not complete after {attempts} check(s)")]
    PollExhausted {
        /// Number of checks performed
        attempts: u32,
    },
}

/// Secure build errors
#[derive(Error, Debug)]
pub enum SecureError {
    /// Operator declined the confirmation prompt
    #[error("Secure release not confirmed")]
    NotConfirmed,

    /// Full-tree snapshot failed or did not verify
    #[error("Snapshot of {path} failed: {reason}")]
    SnapshotFailed {
        /// Snapshot directory
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Build step failed
    #[error("Build command '{command}' failed: {reason}")]
    BuildFailed {
        /// Build command line
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Build command is empty
    #[error("No build command configured")]
    NoBuildCommand,

    /// Writing a generated file failed
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// File that could not be written
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {reason}")]
    ReadFailed {
        /// Config file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Config file content is invalid
    #[error("Invalid config {path}: {reason}")]
    Invalid {
        /// Config file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Preflight(PreflightError::MissingEntries { missing }) => vec![
                format!("Restore the missing entries: {}", display_paths(missing)),
                "Check the backup directory for earlier copies".to_string(),
                "Run from the GamesStore repository root or pass --root".to_string(),
            ],
            ReleaseError::Preflight(PreflightError::RootNotFound { .. }) => vec![
                "Pass an existing directory with --root".to_string(),
            ],
            ReleaseError::Version(VersionError::Missing { .. })
            | ReleaseError::Version(VersionError::InvalidVersion { .. }) => vec![
                "Pass a dotted numeric version, e.g. 2.0.1".to_string(),
            ],
            ReleaseError::Git(GitError::NotRepository) => vec![
                "Initialize the repository: git init".to_string(),
                "Run from the repository root or pass --root".to_string(),
            ],
            ReleaseError::Git(GitError::RemoteNotFound { remote }) => vec![
                format!("Add the remote: git remote add {remote} <url>"),
                "Verify git remote URL: git remote -v".to_string(),
            ],
            ReleaseError::Secure(SecureError::BuildFailed { .. }) => vec![
                "Fix the build error above; no files were removed".to_string(),
                "Run the build command by hand to inspect the output".to_string(),
            ],
            ReleaseError::Secure(SecureError::SnapshotFailed { .. }) => vec![
                "Check free disk space next to the repository".to_string(),
            ],
            ReleaseError::Backup(BackupError::DuplicateName { .. }) => vec![
                "Give every required file a distinct file name".to_string(),
            ],
            ReleaseError::Config(_) => vec![
                "Check gamesstore-release.toml or the path given with --config".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by re-running after a manual fix
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Git(GitError::NotRepository)
                | ReleaseError::Version(VersionError::InvalidVersion { .. })
                | ReleaseError::Secure(SecureError::NotConfirmed)
        )
    }
}
