//! A tiny stand-in for the orchestration layer.
//!
//! Each tick asks the engine for a decision, then "runs" every activated
//! step by recording its scripted status and bumping its age. The loop stops
//! on a terminal outcome, when nothing is left to activate, or after
//! `max_ticks`.

use std::collections::BTreeMap;

use tracing::debug;

use gauntlet_contracts::{
    error::{GauntletError, GauntletResult},
    status::{JobStatus, Outcome},
    transition::{AgeMap, RawStatus, START},
};
use gauntlet_core::NextStepsEngine;

/// Scripted results per step. Each activation consumes one entry; the last
/// entry repeats once the list is exhausted.
#[derive(Debug, Default)]
pub struct Script {
    results: BTreeMap<String, Vec<JobStatus>>,
    attempts: BTreeMap<String, usize>,
}

impl Script {
    /// Parse `step=status[,status...]` arguments.
    pub fn parse(args: &[String]) -> GauntletResult<Self> {
        let mut results = BTreeMap::new();
        for arg in args {
            let (step, statuses) = arg.split_once('=').ok_or_else(|| {
                GauntletError::configuration(format!("script entry '{arg}' is not STEP=STATUS"))
            })?;
            let statuses = statuses
                .split(',')
                .map(|s| {
                    s.trim().parse::<JobStatus>().map_err(|e| {
                        GauntletError::configuration(format!("script entry '{arg}': {e}"))
                    })
                })
                .collect::<GauntletResult<Vec<_>>>()?;
            results.insert(step.trim().to_string(), statuses);
        }
        Ok(Self {
            results,
            attempts: BTreeMap::new(),
        })
    }

    /// The status `step` reports on its next run.
    fn next_result(&mut self, step: &str) -> JobStatus {
        let attempt = self.attempts.entry(step.to_string()).or_insert(0);
        let status = self
            .results
            .get(step)
            .and_then(|list| list.get(*attempt).or_else(|| list.last()))
            .copied()
            .unwrap_or(JobStatus::Success);
        *attempt += 1;
        status
    }
}

/// What happened during a simulated submission.
#[derive(Debug)]
pub struct Report {
    /// One human-readable line per tick.
    pub ticks: Vec<String>,
    pub outcome: Option<Outcome>,
    /// Why the loop stopped without an outcome, empty otherwise.
    pub stop_reason: String,
}

/// Drive `engine` until it reports a terminal outcome or stops making progress.
pub fn run(engine: &dyn NextStepsEngine, mut script: Script, max_ticks: u32) -> GauntletResult<Report> {
    let mut status: RawStatus = RawStatus::new();
    status.insert(START.to_string(), JobStatus::Success.to_string());
    let mut ages = AgeMap::new();
    let mut clock: u64 = 0;
    let mut ticks = Vec::new();

    for tick in 1..=max_ticks {
        let decision = engine.get_next_steps_with_ages(&status, &ages)?;

        if let Some(outcome) = decision.outcome {
            ticks.push(format!("tick {tick}: complete ({outcome})"));
            return Ok(Report {
                ticks,
                outcome: Some(outcome),
                stop_reason: String::new(),
            });
        }

        if decision.is_idle() {
            ticks.push(format!("tick {tick}: nothing to activate"));
            return Ok(Report {
                ticks,
                outcome: None,
                stop_reason: format!("no steps to activate after {tick} ticks"),
            });
        }

        let mut ran = Vec::with_capacity(decision.to_activate.len());
        for step in &decision.to_activate {
            clock += 1;
            let result = script.next_result(step);
            debug!(tick, step = %step, result = %result, age = clock, "simulated step finished");
            status.insert(step.clone(), result.to_string());
            ages.insert(step.clone(), clock);
            ran.push(format!("{step}={result}"));
        }
        ticks.push(format!("tick {tick}: ran {}", ran.join(" ")));
    }

    Ok(Report {
        ticks,
        outcome: None,
        stop_reason: format!("gave up after {max_ticks} ticks"),
    })
}

#[cfg(test)]
mod tests {
    use gauntlet_contracts::transition::TransitionRow;
    use gauntlet_core::ChallengeTransitions;

    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn two_stage() -> ChallengeTransitions {
        let rows = [
            TransitionRow::new("START", "success", "a"),
            TransitionRow::new("a", "success", "b"),
            TransitionRow::new("b", "success", "SUCCESS"),
            TransitionRow::new("a", "failed", "FAILED"),
            TransitionRow::new("b", "failed", "FAILED"),
        ];
        ChallengeTransitions::from_rows(vec!["a".into(), "b".into()], &rows).unwrap()
    }

    #[test]
    fn all_success_completes() {
        let report = run(&two_stage(), Script::default(), 10).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Success));
        assert_eq!(
            report.ticks,
            vec!["tick 1: ran a=success", "tick 2: ran b=success", "tick 3: complete (success)"]
        );
    }

    #[test]
    fn transient_failure_is_retried() {
        let script = Script::parse(&args(&["b=host-error,timeout,success"])).unwrap();
        let report = run(&two_stage(), script, 10).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Success));
        assert_eq!(report.ticks.len(), 5, "b runs three times: {:?}", report.ticks);
    }

    #[test]
    fn failure_ends_submission() {
        let script = Script::parse(&args(&["a=failed"])).unwrap();
        let report = run(&two_stage(), script, 10).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Failed));
    }

    #[test]
    fn endless_transient_gives_up() {
        let script = Script::parse(&args(&["a=aborted"])).unwrap();
        let report = run(&two_stage(), script, 4).unwrap();
        assert_eq!(report.outcome, None);
        assert!(report.stop_reason.contains("gave up after 4 ticks"));
    }

    #[test]
    fn unhandled_status_stalls() {
        // `error` on `a` has no transition in this table.
        let script = Script::parse(&args(&["a=error"])).unwrap();
        let report = run(&two_stage(), script, 10).unwrap();
        assert_eq!(report.outcome, None);
        assert!(report.stop_reason.contains("no steps to activate"));
    }

    #[test]
    fn bad_script_entries_are_rejected() {
        assert!(Script::parse(&args(&["a"])).is_err());
        assert!(Script::parse(&args(&["a=finished"])).is_err());
    }
}
