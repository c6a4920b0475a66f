//! Filesystem operations of the secure (compiled-only) release.

mod build;
mod ignore;
mod snapshot;
mod strip;

pub use build::run_build;
pub use ignore::{IGNORE_FILE, render_ignore_rules, write_ignore_rules};
pub use snapshot::{snapshot_path, snapshot_tree};
pub use strip::{FileClass, RemovalSummary, StripPolicy};
