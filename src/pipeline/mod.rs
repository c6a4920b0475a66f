//! Release pipelines.
//!
//! Every step receives the workspace and remote handles explicitly, and every
//! step's failure policy comes from [`Step::severity`].

mod orchestrator;
mod plan;
mod secure;
mod step;
mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{DEFAULT_WORKFLOW, ReleaseOrchestrator};
pub use plan::{CommitPlan, DEFAULT_OLD_REASON, PushMode, ReleaseRequest, TagSpec, TagStyle};
pub use secure::SecurePipeline;
pub use step::{RunReport, Severity, Step, StepOutcome, StepRecord};
pub use wait::{FixedDelay, NoWait, PollUntil, WaitStrategy};
