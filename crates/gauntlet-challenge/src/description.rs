//! The challenge description: the aggregate the orchestration layer holds.
//!
//! `ChallengeDescription` is built once from configuration and owns the
//! validated transition table (and through it the step graph). It
//! implements [`NextStepsEngine`], whose `get_next_steps` is the only call
//! the rest of the pipeline needs.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use gauntlet_contracts::{
    error::{GauntletError, GauntletResult},
    transition::{Node, TransitionRow},
};
use gauntlet_core::{traits::NextStepsEngine, transitions::ChallengeTransitions};

use crate::config::ChallengeConfig;

/// A loaded challenge.
///
/// ```rust,ignore
/// use gauntlet_challenge::ChallengeDescription;
/// use gauntlet_core::NextStepsEngine;
///
/// let challenge = ChallengeDescription::from_file(Path::new("challenges/two_stage.toml"))?;
/// let decision = challenge.get_next_steps(&status)?;
/// ```
#[derive(Debug, Clone)]
pub struct ChallengeDescription {
    name: String,
    description: Option<String>,
    transitions: ChallengeTransitions,
}

impl ChallengeDescription {
    /// Build from a step list and string transition rows.
    ///
    /// An empty `rows` slice is accepted only for a single-step challenge.
    pub fn new(name: impl Into<String>, steps: Vec<String>, rows: &[TransitionRow]) -> GauntletResult<Self> {
        let name = name.into();
        let transitions = ChallengeTransitions::from_rows(steps, rows).map_err(|e| match e {
            GauntletError::Configuration { reason } => GauntletError::Configuration {
                reason: format!("challenge '{name}': {reason}"),
            },
            other => other,
        })?;

        info!(
            challenge = %name,
            steps = transitions.steps().len(),
            transitions = transitions.transitions().len(),
            "challenge loaded"
        );

        Ok(Self {
            name,
            description: None,
            transitions,
        })
    }

    /// Build from an already-parsed configuration.
    pub fn from_config(config: &ChallengeConfig) -> GauntletResult<Self> {
        let mut challenge =
            Self::new(config.name.clone(), config.step_names(), &config.transition_rows())?;
        challenge.description = config.description.clone();
        Ok(challenge)
    }

    /// Parse `s` as TOML and build the challenge.
    ///
    /// Returns `GauntletError::Configuration` if the TOML is malformed, does
    /// not match [`ChallengeConfig`], or describes an invalid table.
    pub fn from_toml_str(s: &str) -> GauntletResult<Self> {
        let config: ChallengeConfig = toml::from_str(s).map_err(|e| GauntletError::Configuration {
            reason: format!("failed to parse challenge TOML: {}", e),
        })?;
        Self::from_config(&config)
    }

    /// Read the file at `path` and parse it as a challenge description.
    pub fn from_file(path: &Path) -> GauntletResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GauntletError::Io {
            reason: format!("failed to read challenge file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared steps in declaration order.
    pub fn steps(&self) -> &[String] {
        self.transitions.steps()
    }

    /// Steps that must have succeeded before `step` is eligible.
    ///
    /// Includes `START` when the step is reachable from it. Unknown steps
    /// have no ancestors.
    pub fn ancestors_of(&self, step: &str) -> BTreeSet<String> {
        self.transitions
            .graph()
            .ancestors_of(&Node::step(step))
            .iter()
            .map(|n| n.as_str().to_string())
            .collect()
    }
}

impl NextStepsEngine for ChallengeDescription {
    fn transitions(&self) -> &ChallengeTransitions {
        &self.transitions
    }
}
