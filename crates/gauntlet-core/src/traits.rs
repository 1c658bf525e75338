//! The integration seam between the engine and the orchestration layer.
//!
//! The orchestration layer only ever needs one call: hand over the latest
//! status snapshot, get back a [`Decision`]. Anything that owns a validated
//! [`ChallengeTransitions`] can serve it.

use gauntlet_contracts::{
    decision::Decision,
    error::GauntletResult,
    transition::{AgeMap, RawStatus},
};

use crate::{engine::evaluate, transitions::ChallengeTransitions};

/// Decides next steps for a submission from its current status snapshot.
///
/// Implementations are immutable after construction, so calls may run
/// concurrently from any number of threads.
pub trait NextStepsEngine: Send + Sync {
    /// The validated table this engine decides over.
    fn transitions(&self) -> &ChallengeTransitions;

    /// Decide without staleness information.
    ///
    /// Precondition: `status["START"] == "success"`.
    fn get_next_steps(&self, status: &RawStatus) -> GauntletResult<Decision> {
        evaluate(self.transitions(), status, None)
    }

    /// Decide, treating an ancestor with a higher age than its dependant as
    /// not yet satisfied.
    fn get_next_steps_with_ages(&self, status: &RawStatus, ages: &AgeMap) -> GauntletResult<Decision> {
        evaluate(self.transitions(), status, Some(ages))
    }
}

impl NextStepsEngine for ChallengeTransitions {
    fn transitions(&self) -> &ChallengeTransitions {
        self
    }
}
