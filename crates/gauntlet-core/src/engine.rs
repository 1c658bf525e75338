//! The full evaluation pipeline for one status update.
//!
//!   Precondition → Sanitize → Decide
//!
//! This is what every [`NextStepsEngine`](crate::traits::NextStepsEngine)
//! call runs. It holds no state between calls; the orchestration layer owns
//! persistence and re-polls as often as it likes.

use tracing::{debug, info};

use gauntlet_contracts::{
    decision::Decision,
    error::{GauntletError, GauntletResult},
    status::JobStatus,
    transition::{AgeMap, RawStatus, START},
};

use crate::{decide::decide, sanitize::sanitize, transitions::ChallengeTransitions};

/// Check the `START: success` precondition, sanitize `raw`, and decide.
///
/// # Errors
///
/// Returns `GauntletError::InvalidSnapshot` if `START` is missing or is not
/// `success`. Every other irregularity in `raw` is sanitized away.
pub fn evaluate(
    table: &ChallengeTransitions,
    raw: &RawStatus,
    ages: Option<&AgeMap>,
) -> GauntletResult<Decision> {
    match raw.get(START).map(String::as_str) {
        Some(s) if s == JobStatus::Success.as_str() => {}
        Some(other) => {
            return Err(GauntletError::InvalidSnapshot {
                reason: format!("START must be 'success', got '{other}'"),
            })
        }
        None => {
            return Err(GauntletError::InvalidSnapshot {
                reason: "START entry is missing".to_string(),
            })
        }
    }

    let status = sanitize(table, raw);
    debug!(
        reported = raw.len(),
        kept = status.len(),
        with_ages = ages.is_some(),
        "evaluating status snapshot"
    );

    let decision = decide(table, &status, ages);

    if let Some(outcome) = decision.outcome {
        info!(outcome = %outcome, "submission reached a terminal outcome");
    } else if !decision.to_activate.is_empty() {
        debug!(to_activate = ?decision.to_activate, "steps to activate");
    }

    Ok(decision)
}
