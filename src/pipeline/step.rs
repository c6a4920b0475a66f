//! Pipeline steps, their failure policy, and the run report.
//!
//! Whether a failed step stops the run is a property of the step itself,
//! declared once in [`Step::severity`].

use crate::backup::BackupRecord;
use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::github::DispatchOutcome;
use std::fmt;
use std::path::PathBuf;

/// What a step failure means for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Stop the run and exit non-zero
    Fatal,
    /// Report and continue
    Warning,
    /// Log at debug level and continue
    Ignore,
}

/// Every step of the release and secure pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Required entries check
    Preflight,
    /// Timestamped copies of required files
    Backup,
    /// Version file rewrite
    WriteVersion,
    /// `git add`
    Stage,
    /// `git commit`
    Commit,
    /// Branch push
    PushBranch,
    /// Local tag removal before re-tagging
    DeleteTag,
    /// Tag creation
    CreateTag,
    /// Tag push
    PushTag,
    /// Explicit workflow dispatch
    Dispatch,
    /// Delay for the remote workflow
    Wait,
    /// Pull after the wait
    Pull,
    /// Restoration of files removed remotely
    Restore,
    /// Remote URL lookup before history is erased
    ResolveRemote,
    /// Full tree copy before stripping
    Snapshot,
    /// Native module build
    Build,
    /// Source file removal
    Strip,
    /// Intermediate artifact and environment removal
    CleanArtifacts,
    /// VCS metadata reset
    ReinitRepository,
    /// Ignore file rewrite
    WriteIgnoreRules,
}

impl Step {
    /// Failure policy of the step
    pub fn severity(&self) -> Severity {
        match self {
            Step::Preflight
            | Step::Backup
            | Step::WriteVersion
            | Step::ResolveRemote
            | Step::Snapshot
            | Step::Build
            | Step::ReinitRepository => Severity::Fatal,
            Step::DeleteTag => Severity::Ignore,
            Step::Stage
            | Step::Commit
            | Step::PushBranch
            | Step::CreateTag
            | Step::PushTag
            | Step::Dispatch
            | Step::Wait
            | Step::Pull
            | Step::Restore
            | Step::Strip
            | Step::CleanArtifacts
            | Step::WriteIgnoreRules => Severity::Warning,
        }
    }

    /// Human-readable step name
    pub fn label(&self) -> &'static str {
        match self {
            Step::Preflight => "preflight",
            Step::Backup => "backup",
            Step::WriteVersion => "write version file",
            Step::Stage => "stage",
            Step::Commit => "commit",
            Step::PushBranch => "push branch",
            Step::DeleteTag => "delete local tag",
            Step::CreateTag => "create tag",
            Step::PushTag => "push tag",
            Step::Dispatch => "dispatch workflow",
            Step::Wait => "wait for workflow",
            Step::Pull => "pull",
            Step::Restore => "restore",
            Step::ResolveRemote => "resolve remote",
            Step::Snapshot => "snapshot tree",
            Step::Build => "build",
            Step::Strip => "strip sources",
            Step::CleanArtifacts => "clean artifacts",
            Step::ReinitRepository => "reinitialize repository",
            Step::WriteIgnoreRules => "write ignore rules",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Completed
    Ok,
    /// Failed, run continued
    Warning(String),
    /// Failed, run stopped
    Fatal(String),
}

/// One executed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Step kind
    pub step: Step,
    /// What the step acted on (tag name, file, ...)
    pub subject: Option<String>,
    /// Outcome
    pub outcome: StepOutcome,
}

/// Everything a pipeline run did
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Tags created, in creation order
    pub tags: Vec<String>,
    /// Backups taken before mutation
    pub backups: Vec<BackupRecord>,
    /// Files restored after the remote round-trip
    pub restored: Vec<PathBuf>,
    /// Required files that were still present after the round-trip
    pub already_present: Vec<PathBuf>,
    /// Dispatch result, when one was requested
    pub dispatch: Option<DispatchOutcome>,
    /// Tree snapshot taken by the secure pipeline
    pub snapshot: Option<PathBuf>,
    /// Files removed by the secure pipeline
    pub removed: Vec<PathBuf>,
    /// Executed steps in order
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    /// Record the result of a step and apply its failure policy.
    ///
    /// Fatal failures are returned as errors. Warnings are printed and
    /// swallowed, yielding `Ok(None)`.
    pub fn settle<T>(
        &mut self,
        step: Step,
        subject: Option<&str>,
        result: Result<T>,
        config: &RuntimeConfig,
    ) -> Result<Option<T>> {
        let subject = subject.map(str::to_string);
        match result {
            Ok(value) => {
                self.steps.push(StepRecord {
                    step,
                    subject,
                    outcome: StepOutcome::Ok,
                });
                Ok(Some(value))
            }
            Err(e) => match step.severity() {
                Severity::Fatal => {
                    log::error!("{} failed: {}", step, e);
                    self.steps.push(StepRecord {
                        step,
                        subject,
                        outcome: StepOutcome::Fatal(e.to_string()),
                    });
                    Err(e)
                }
                Severity::Warning => {
                    config.warning_println(&format!("{} failed: {}", step, e));
                    self.steps.push(StepRecord {
                        step,
                        subject,
                        outcome: StepOutcome::Warning(e.to_string()),
                    });
                    Ok(None)
                }
                Severity::Ignore => {
                    log::debug!("{} failed (ignored): {}", step, e);
                    self.steps.push(StepRecord {
                        step,
                        subject,
                        outcome: StepOutcome::Ok,
                    });
                    Ok(None)
                }
            },
        }
    }

    /// Record a warning without settling a result
    pub fn warn(
        &mut self,
        step: Step,
        subject: Option<&str>,
        message: String,
        config: &RuntimeConfig,
    ) {
        config.warning_println(&message);
        self.steps.push(StepRecord {
            step,
            subject: subject.map(str::to_string),
            outcome: StepOutcome::Warning(message),
        });
    }

    /// All warning messages in order
    pub fn warnings(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|r| match &r.outcome {
                StepOutcome::Warning(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Outcome of the first record of a step, if it ran
    pub fn outcome_of(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    /// Whether a step ran and succeeded for a given subject
    pub fn succeeded(&self, step: Step, subject: &str) -> bool {
        self.steps.iter().any(|r| {
            r.step == step && r.subject.as_deref() == Some(subject) && r.outcome == StepOutcome::Ok
        })
    }
}
