//! The next-steps decision function.
//!
//! Given a sanitized snapshot (and optionally per-step ages), `decide` walks
//! every transition in declaration order:
//!
//! 1. A transition fires when its source reports the transition's condition
//!    and every ancestor of the source has succeeded and is not stale.
//! 2. A fired transition whose target is already present (and not `aborted`)
//!    with satisfied, fresh ancestors is already handled and is skipped.
//! 3. Otherwise a terminal target records an outcome and a step target is
//!    appended to `to_activate`.
//!
//! Staleness compares a node only with its own ancestors. It is not
//! transitive: in `a -> b -> c`, a stale `b` does not make a fresh-looking
//! `c` stale, so `c` may still fire a terminal outcome while `b` reruns.
//!
//! Scanning never stops early: several branches may progress in one pass.
//! The function is pure, so the same inputs always produce the same decision.

use std::collections::BTreeSet;

use tracing::{trace, warn};

use gauntlet_contracts::{
    decision::Decision,
    status::{JobStatus, Outcome},
    transition::{AgeMap, Node, StatusSnapshot},
};

use crate::transitions::ChallengeTransitions;

/// Decide which steps run next and whether the submission is complete.
///
/// `status` must already be sanitized. When several terminal outcomes fire
/// in the same call, the most severe one wins (error > failed > success).
pub fn decide(table: &ChallengeTransitions, status: &StatusSnapshot, ages: Option<&AgeMap>) -> Decision {
    let gate = Gate { table, status, ages };

    let mut to_activate: Vec<String> = Vec::new();
    let mut outcomes: BTreeSet<Outcome> = BTreeSet::new();

    for transition in table.transitions() {
        let fired = status.get(transition.from.as_str()) == Some(&transition.on)
            && gate.predecessors_success(&transition.from);
        if !fired {
            continue;
        }

        let already_handled = status
            .get(transition.to.as_str())
            .is_some_and(|s| !s.is_like_nonexistent())
            && gate.predecessors_success(&transition.to);
        if already_handled {
            trace!(%transition, "target already handled");
            continue;
        }

        match &transition.to {
            Node::Terminal(outcome) => {
                outcomes.insert(*outcome);
            }
            Node::Step(name) => {
                if !to_activate.contains(name) {
                    to_activate.push(name.clone());
                }
            }
            // Rejected when the table is built.
            Node::Start => {}
        }
    }

    let outcome = outcomes.iter().copied().max_by_key(|o| o.severity());
    if outcomes.len() > 1 {
        let fired: Vec<&str> = outcomes.iter().map(|o| o.as_str()).collect();
        warn!(
            fired = ?fired,
            chosen = ?outcome,
            "several terminal outcomes fired in one pass"
        );
    }

    match outcome {
        Some(outcome) => Decision {
            complete: true,
            outcome: Some(outcome),
            to_activate,
        },
        None => Decision::pending(to_activate),
    }
}

/// Ancestor gating for one decision call.
struct Gate<'a> {
    table: &'a ChallengeTransitions,
    status: &'a StatusSnapshot,
    ages: Option<&'a AgeMap>,
}

impl Gate<'_> {
    /// Missing ages order below every present age, so omitting ages never
    /// blocks progress.
    fn age(&self, node: &Node) -> Option<u64> {
        self.ages.and_then(|ages| ages.get(node.as_str()).copied())
    }

    /// True iff every ancestor of `node` reports `success` and is no newer than `node`.
    fn predecessors_success(&self, node: &Node) -> bool {
        let own_age = self.age(node);
        self.table.graph().ancestors_of(node).iter().all(|ancestor| {
            self.status.get(ancestor.as_str()) == Some(&JobStatus::Success)
                && self.age(ancestor) <= own_age
        })
    }
}
