//! Challenge configuration schema.
//!
//! A `ChallengeConfig` is deserialized from TOML and holds the declared
//! steps and an ordered list of transitions. Transition order is kept
//! exactly as written.
//!
//! Example:
//! ```toml
//! name = "two-stage"
//!
//! [[steps]]
//! name = "build"
//!
//! [[steps]]
//! name = "score"
//!
//! [[transitions]]
//! from = "START"
//! on = "success"
//! to = "build"
//! ```

use serde::{Deserialize, Serialize};

use gauntlet_contracts::transition::TransitionRow;

/// One evaluation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique name, referenced by transitions and status snapshots.
    pub name: String,

    /// Free-form note shown by tooling.
    #[serde(default)]
    pub description: Option<String>,
}

/// A transition rule as written in TOML.
///
/// `from` is `"START"` or a step name, `on` is a job status such as
/// `"success"` or `"failed"`, and `to` is a step name or one of the terminal
/// labels `"SUCCESS"`, `"FAILED"`, `"ERROR"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub from: String,
    pub on: String,
    pub to: String,
}

impl From<&TransitionConfig> for TransitionRow {
    fn from(config: &TransitionConfig) -> Self {
        TransitionRow::new(config.from.as_str(), config.on.as_str(), config.to.as_str())
    }
}

/// The top-level structure deserialized from a challenge file.
///
/// `transitions` may be omitted for a single-step challenge; the canonical
/// table is synthesized in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Human-readable challenge identifier.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Declared steps, in order.
    pub steps: Vec<StepConfig>,

    /// Ordered transition rules.
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

impl ChallengeConfig {
    /// Step names in declaration order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name.clone()).collect()
    }

    /// Transitions as plain string rows.
    pub fn transition_rows(&self) -> Vec<TransitionRow> {
        self.transitions.iter().map(TransitionRow::from).collect()
    }
}
