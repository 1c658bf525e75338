//! Cleanup of raw status snapshots before they reach the decider.
//!
//! Snapshots are assembled by a distributed system, so races and stale or
//! unexpected entries are normal. Nothing here is an error: entries the
//! decider cannot use are dropped and logged at `debug`.
//!
//! Per entry, in order:
//!
//! 1. Keys that are neither `START` nor a declared step are dropped.
//! 2. Values that are not an allowed job status are dropped.
//! 3. Transient statuses (`timeout`, `aborted`, `host-error`) are dropped, so
//!    the step looks exactly like one that has never reported.
//!
//! The `START: success` precondition is not repaired here.

use tracing::debug;

use gauntlet_contracts::{
    status::JobStatus,
    transition::{RawStatus, StatusSnapshot, START},
};

use crate::transitions::ChallengeTransitions;

/// Why an entry was removed from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownStep,
    InvalidStatus,
    TransientStatus,
}

/// Build a sanitized copy of `raw`. The input is left untouched.
pub fn sanitize(table: &ChallengeTransitions, raw: &RawStatus) -> StatusSnapshot {
    raw.iter()
        .filter_map(|(key, value)| match classify(table, key, value) {
            Ok(status) => Some((key.clone(), status)),
            Err(reason) => {
                debug!(step = %key, status = %value, reason = ?reason, "dropping status entry");
                None
            }
        })
        .collect()
}

/// Entries [`sanitize`] would drop, with the reason for each.
pub fn dropped_entries<'a>(
    table: &ChallengeTransitions,
    raw: &'a RawStatus,
) -> Vec<(&'a str, &'a str, DropReason)> {
    raw.iter()
        .filter_map(|(key, value)| {
            classify(table, key, value)
                .err()
                .map(|reason| (key.as_str(), value.as_str(), reason))
        })
        .collect()
}

fn classify(table: &ChallengeTransitions, key: &str, value: &str) -> Result<JobStatus, DropReason> {
    if key != START && !table.is_step(key) {
        return Err(DropReason::UnknownStep);
    }
    let status: JobStatus = value.parse().map_err(|_| DropReason::InvalidStatus)?;
    if status.is_transient() {
        return Err(DropReason::TransientStatus);
    }
    Ok(status)
}
