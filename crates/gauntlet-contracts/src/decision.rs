//! The value returned to the orchestration layer after each status update.

use serde::{Deserialize, Serialize};

use crate::status::Outcome;

/// What the engine decided for one status snapshot.
///
/// Callers pattern-match on this to decide what to do next:
/// - `complete == true` → mark the submission with `outcome`
/// - otherwise → schedule evaluator jobs for every name in `to_activate`
///
/// `to_activate` is still computed when `complete` is true (an unrelated
/// branch may have progressed in the same pass) but is advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decision {
    /// True iff at least one transition into a terminal label fired.
    pub complete: bool,
    /// The chosen terminal outcome, present iff `complete`.
    pub outcome: Option<Outcome>,
    /// Steps to (re)activate, in transition declaration order, without duplicates.
    pub to_activate: Vec<String>,
}

impl Decision {
    /// A decision that only activates steps.
    pub fn pending(to_activate: Vec<String>) -> Self {
        Self {
            complete: false,
            outcome: None,
            to_activate,
        }
    }

    /// Returns true if nothing is complete and nothing needs to run.
    ///
    /// The orchestration layer sees this while steps are still evaluating,
    /// or when the snapshot has reached a dead end.
    pub fn is_idle(&self) -> bool {
        !self.complete && self.to_activate.is_empty()
    }
}
