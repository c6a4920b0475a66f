//! Git operations and remote description for release workflows.
//!
//! Git is driven through the system binary. The remote side is described by a
//! [`RemoteHandle`] that is passed explicitly into every pipeline.

mod operations;
mod remote;
mod system_git;

pub use operations::{CommitInfo, GitOperations, PushInfo, TagInfo};
pub use remote::RemoteHandle;
pub use system_git::SystemGit;
