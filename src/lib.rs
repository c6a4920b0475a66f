//! # GamesStore Release
//!
//! Release orchestration for the GamesStore repository.
//!
//! A release checks that the required files exist, backs them up, writes the
//! version file, commits, tags and pushes, gives the remote build workflow
//! time to run, pulls the result back and restores any required file the
//! round-trip removed.
//!
//! ## Features
//!
//! - **Abort-early preflight**: nothing is touched until every required file is present
//! - **Timestamped backups**: one copy per required file per run, restored from the newest
//! - **Beta pairing**: a synthetic older beta for exercising the updater
//! - **Workflow dispatch**: `gh` CLI, then the REST API, then a manual link
//! - **Secure builds**: compiled modules only, with a verified snapshot first
//!
//! ## Usage
//!
//! ```bash
//! gamesstore_release release 1.4.0 "Inventory fixes"
//! gamesstore_release release-beta 1.5.0 --create-old-version
//! gamesstore_release release-beta-old-pair 1.5.0
//! gamesstore_release release-special "Hotfix" --tag-version 1.4.1
//! gamesstore_release secure-release 2.0.0 --yes
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod pipeline;
pub mod secure;
pub mod version;
pub mod workspace;

// Re-export main types for public API
pub use cli::Args;
pub use config::{EnvConfig, ProjectConfig};
pub use error::{CliError, ReleaseError, Result};
pub use git::{GitOperations, RemoteHandle, SystemGit};
pub use github::{GitHubDispatcher, WorkflowTrigger};
pub use pipeline::{
    ReleaseOrchestrator, ReleaseRequest, RunReport, SecurePipeline, Step, StepOutcome,
};
pub use version::{ReleaseMode, ReleaseVersion};
pub use workspace::WorkspaceHandle;
