//! GitHub integration: repository identification and workflow dispatch

mod dispatch;
mod repo;

pub use dispatch::{DispatchOutcome, DispatchRequest, GitHubDispatcher, WorkflowTrigger};
pub use repo::RepoSlug;
