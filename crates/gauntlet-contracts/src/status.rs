//! Job statuses and terminal outcomes.
//!
//! Both vocabularies are closed: the wire strings below are stable and shared
//! with the orchestration layer, so they are modelled as enums rather than
//! loose string literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The last known status of a step, as reported by the orchestration layer.
///
/// Wire values are kebab-case: `evaluating`, `success`, `timeout`, `failed`,
/// `error`, `aborted`, `host-error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// The step is currently running.
    Evaluating,
    /// The step finished successfully.
    Success,
    /// The step did not finish in time.
    Timeout,
    /// The step failed through the submission's fault.
    Failed,
    /// The step errored through the evaluator's fault.
    Error,
    /// The step was manually aborted.
    Aborted,
    /// The environment failed; the step may be retried.
    HostError,
}

impl JobStatus {
    /// Every allowed status, in wire declaration order.
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Evaluating,
        JobStatus::Success,
        JobStatus::Timeout,
        JobStatus::Failed,
        JobStatus::Error,
        JobStatus::Aborted,
        JobStatus::HostError,
    ];

    /// The stable wire string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Evaluating => "evaluating",
            JobStatus::Success => "success",
            JobStatus::Timeout => "timeout",
            JobStatus::Failed => "failed",
            JobStatus::Error => "error",
            JobStatus::Aborted => "aborted",
            JobStatus::HostError => "host-error",
        }
    }

    /// Statuses that are treated as if the step had never run.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            JobStatus::Timeout | JobStatus::Aborted | JobStatus::HostError
        )
    }

    /// Statuses that never count as "already handled" for a transition target.
    pub fn is_like_nonexistent(self) -> bool {
        matches!(self, JobStatus::Aborted)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the allowed job statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an allowed job status", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// The final outcome of a submission.
///
/// Transitions declare outcomes with upper-case terminal labels
/// (`SUCCESS`, `FAILED`, `ERROR`); decisions report them lower-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
    Error,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Success, Outcome::Failed, Outcome::Error];

    /// The upper-case label used on the target side of a transition.
    pub fn terminal_label(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Failed => "FAILED",
            Outcome::Error => "ERROR",
        }
    }

    /// The lower-case outcome string reported to callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failed => "failed",
            Outcome::Error => "error",
        }
    }

    /// Precedence used when several outcomes fire in the same decision.
    /// Higher wins: error > failed > success.
    pub fn severity(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failed => 1,
            Outcome::Error => 2,
        }
    }

    /// Parse an upper-case terminal label.
    pub fn from_terminal_label(label: &str) -> Option<Self> {
        Outcome::ALL
            .into_iter()
            .find(|outcome| outcome.terminal_label() == label)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
