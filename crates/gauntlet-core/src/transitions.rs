//! The validated transition table.
//!
//! `ChallengeTransitions` owns the declared steps, the ordered transition
//! rules, and the [`StepGraph`] derived from them. Every row is checked at
//! construction; a table that exists is a table the decider can trust.
//!
//! Validation rules:
//!
//! 1. Step names are non-empty, unique, and not one of the reserved labels
//!    `START`, `SUCCESS`, `FAILED`, `ERROR`.
//! 2. A transition source is `START` or a declared step.
//! 3. A transition target is a terminal label or a declared step.
//! 4. The condition is an allowed job status.
//! 5. The resulting graph has no cycles.
//!
//! With no transitions and exactly one step, the canonical four-row table is
//! synthesized. With no transitions and any other step count, construction
//! fails.

use std::collections::BTreeSet;

use tracing::debug;

use gauntlet_contracts::{
    error::{GauntletError, GauntletResult},
    status::{JobStatus, Outcome},
    transition::{Node, Transition, TransitionRow, RESERVED_LABELS, START},
};

use crate::graph::StepGraph;

/// Steps, transitions, and the graph they induce. Immutable once built.
#[derive(Debug, Clone)]
pub struct ChallengeTransitions {
    steps: Vec<String>,
    step_set: BTreeSet<String>,
    transitions: Vec<Transition>,
    graph: StepGraph,
}

impl ChallengeTransitions {
    /// Validate `steps` and `transitions` and build the table.
    ///
    /// An empty `transitions` list is treated as no transitions at all; see
    /// [`ChallengeTransitions::with_default`].
    pub fn new(steps: Vec<String>, transitions: Vec<Transition>) -> GauntletResult<Self> {
        Self::with_default(steps, Some(transitions).filter(|t| !t.is_empty()))
    }

    /// Validate and build, synthesizing the canonical table when
    /// `transitions` is `None` and there is exactly one step.
    pub fn with_default(steps: Vec<String>, transitions: Option<Vec<Transition>>) -> GauntletResult<Self> {
        let step_set = validate_steps(&steps)?;

        let transitions = match (transitions, steps.as_slice()) {
            (Some(transitions), _) => transitions,
            (None, [only]) => default_transitions(only),
            (None, _) => {
                return Err(GauntletError::configuration(format!(
                    "need transitions when there is not exactly one step (got {} steps)",
                    steps.len()
                )))
            }
        };

        for (index, transition) in transitions.iter().enumerate() {
            validate_transition(index, transition, &step_set)?;
        }

        let graph = StepGraph::from_transitions(&transitions);
        if let Some(cycle) = graph.find_cycle() {
            let path: Vec<&str> = cycle.iter().map(Node::as_str).collect();
            return Err(GauntletError::configuration(format!(
                "transitions form a cycle: {}",
                path.join(" -> ")
            )));
        }

        debug!(
            steps = steps.len(),
            transitions = transitions.len(),
            "transition table built"
        );

        Ok(Self {
            steps,
            step_set,
            transitions,
            graph,
        })
    }

    /// A one-step challenge with the canonical table.
    pub fn single_step(step: impl Into<String>) -> GauntletResult<Self> {
        Self::with_default(vec![step.into()], None)
    }

    /// Parse string triples such as `("START", "success", "build")` and build
    /// the table. Errors name the offending row.
    pub fn from_rows(steps: Vec<String>, rows: &[TransitionRow]) -> GauntletResult<Self> {
        let step_set = validate_steps(&steps)?;
        let transitions = rows
            .iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row, &step_set))
            .collect::<GauntletResult<Vec<_>>>()?;
        Self::new(steps, transitions)
    }

    /// Declared steps in declaration order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Returns true if `name` is a declared step.
    pub fn is_step(&self, name: &str) -> bool {
        self.step_set.contains(name)
    }
}

/// `START -success-> S`, `S -success-> SUCCESS`, `S -failed-> FAILED`, `S -error-> ERROR`.
fn default_transitions(step: &str) -> Vec<Transition> {
    let s = Node::step(step);
    vec![
        Transition::new(Node::Start, JobStatus::Success, s.clone()),
        Transition::new(s.clone(), JobStatus::Success, Node::Terminal(Outcome::Success)),
        Transition::new(s.clone(), JobStatus::Failed, Node::Terminal(Outcome::Failed)),
        Transition::new(s, JobStatus::Error, Node::Terminal(Outcome::Error)),
    ]
}

fn validate_steps(steps: &[String]) -> GauntletResult<BTreeSet<String>> {
    let mut set = BTreeSet::new();
    for step in steps {
        if step.is_empty() {
            return Err(GauntletError::configuration("step names must not be empty"));
        }
        if RESERVED_LABELS.contains(&step.as_str()) {
            return Err(GauntletError::configuration(format!(
                "step name '{step}' is a reserved label"
            )));
        }
        if !set.insert(step.clone()) {
            return Err(GauntletError::configuration(format!(
                "step '{step}' is declared more than once"
            )));
        }
    }
    Ok(set)
}

fn validate_transition(
    index: usize,
    transition: &Transition,
    steps: &BTreeSet<String>,
) -> GauntletResult<()> {
    let source_ok = match &transition.from {
        Node::Start => true,
        Node::Step(name) => steps.contains(name),
        Node::Terminal(_) => false,
    };
    if !source_ok {
        return Err(GauntletError::configuration(format!(
            "transition {index} ({transition}): source '{}' is neither START nor a declared step",
            transition.from
        )));
    }

    let target_ok = match &transition.to {
        Node::Start => false,
        Node::Step(name) => steps.contains(name),
        Node::Terminal(_) => true,
    };
    if !target_ok {
        return Err(GauntletError::configuration(format!(
            "transition {index} ({transition}): target '{}' is neither a terminal label nor a declared step",
            transition.to
        )));
    }

    Ok(())
}

fn parse_row(index: usize, row: &TransitionRow, steps: &BTreeSet<String>) -> GauntletResult<Transition> {
    let from = if row.from == START {
        Node::Start
    } else if steps.contains(&row.from) {
        Node::Step(row.from.clone())
    } else {
        return Err(GauntletError::configuration(format!(
            "transition {index} {row}: source '{}' is neither START nor a declared step",
            row.from
        )));
    };

    let on: JobStatus = row.on.parse().map_err(|e| {
        GauntletError::configuration(format!("transition {index} {row}: {e}"))
    })?;

    let to = if let Some(outcome) = Outcome::from_terminal_label(&row.to) {
        Node::Terminal(outcome)
    } else if steps.contains(&row.to) {
        Node::Step(row.to.clone())
    } else {
        return Err(GauntletError::configuration(format!(
            "transition {index} {row}: target '{}' is neither a terminal label nor a declared step",
            row.to
        )));
    };

    Ok(Transition::new(from, on, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn expect_config_error(result: GauntletResult<ChallengeTransitions>, needle: &str) {
        match result {
            Err(GauntletError::Configuration { reason }) => {
                assert!(reason.contains(needle), "expected '{needle}' in: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn single_step_synthesizes_canonical_table() {
        let table = ChallengeTransitions::single_step("lf").unwrap();
        let rendered: Vec<String> = table.transitions().iter().map(|t| t.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "START --success--> lf",
                "lf --success--> SUCCESS",
                "lf --failed--> FAILED",
                "lf --error--> ERROR",
            ]
        );
        assert_eq!(table.steps(), ["lf".to_string()]);
    }

    #[test]
    fn missing_transitions_with_two_steps_fails() {
        expect_config_error(
            ChallengeTransitions::new(steps(&["a", "b"]), vec![]),
            "need transitions",
        );
    }

    #[test]
    fn missing_transitions_with_zero_steps_fails() {
        expect_config_error(ChallengeTransitions::new(vec![], vec![]), "need transitions");
    }

    #[test]
    fn with_default_only_synthesizes_for_none() {
        let synthesized = ChallengeTransitions::with_default(steps(&["lf"]), None).unwrap();
        assert_eq!(synthesized.transitions().len(), 4);

        let explicit = vec![
            Transition::new(Node::Start, JobStatus::Success, Node::step("lf")),
            Transition::new(Node::step("lf"), JobStatus::Success, Node::Terminal(Outcome::Success)),
        ];
        let given = ChallengeTransitions::with_default(steps(&["lf"]), Some(explicit)).unwrap();
        assert_eq!(given.transitions().len(), 2);

        expect_config_error(
            ChallengeTransitions::with_default(steps(&["a", "b"]), None),
            "got 2 steps",
        );
    }

    #[test]
    fn undeclared_target_fails() {
        let rows = [
            TransitionRow::new("START", "success", "a"),
            TransitionRow::new("a", "success", "ghost"),
        ];
        expect_config_error(
            ChallengeTransitions::from_rows(steps(&["a"]), &rows),
            "transition 1 (a, success, ghost)",
        );
    }

    #[test]
    fn undeclared_source_fails() {
        let rows = [TransitionRow::new("ghost", "success", "SUCCESS")];
        expect_config_error(
            ChallengeTransitions::from_rows(steps(&["a"]), &rows),
            "source 'ghost'",
        );
    }

    #[test]
    fn terminal_label_as_source_fails() {
        let rows = [TransitionRow::new("SUCCESS", "success", "a")];
        expect_config_error(
            ChallengeTransitions::from_rows(steps(&["a"]), &rows),
            "source 'SUCCESS'",
        );
    }

    #[test]
    fn start_as_target_fails() {
        let transitions = vec![Transition::new(Node::step("a"), JobStatus::Success, Node::Start)];
        expect_config_error(
            ChallengeTransitions::new(steps(&["a"]), transitions),
            "target 'START'",
        );
    }

    #[test]
    fn disallowed_condition_fails() {
        let rows = [TransitionRow::new("START", "finished", "a")];
        expect_config_error(
            ChallengeTransitions::from_rows(steps(&["a"]), &rows),
            "'finished' is not an allowed job status",
        );
    }

    #[test]
    fn lower_case_terminal_label_is_not_a_target() {
        let rows = [TransitionRow::new("a", "success", "success")];
        expect_config_error(
            ChallengeTransitions::from_rows(steps(&["a"]), &rows),
            "target 'success'",
        );
    }

    #[test]
    fn reserved_and_duplicate_step_names_fail() {
        expect_config_error(ChallengeTransitions::single_step("START"), "reserved label");
        expect_config_error(
            ChallengeTransitions::new(steps(&["a", "a"]), vec![]),
            "declared more than once",
        );
        expect_config_error(ChallengeTransitions::single_step(""), "must not be empty");
    }

    #[test]
    fn cycles_are_rejected() {
        let rows = [
            TransitionRow::new("START", "success", "a"),
            TransitionRow::new("a", "success", "b"),
            TransitionRow::new("b", "failed", "a"),
        ];
        expect_config_error(
            ChallengeTransitions::from_rows(steps(&["a", "b"]), &rows),
            "cycle: a -> b -> a",
        );
    }

    #[test]
    fn declaration_order_is_preserved() {
        let rows = [
            TransitionRow::new("START", "success", "b"),
            TransitionRow::new("START", "success", "a"),
            TransitionRow::new("a", "success", "SUCCESS"),
            TransitionRow::new("b", "error", "ERROR"),
        ];
        let table = ChallengeTransitions::from_rows(steps(&["b", "a"]), &rows).unwrap();
        assert_eq!(table.steps(), ["b".to_string(), "a".to_string()]);
        assert_eq!(table.transitions()[0].to, Node::step("b"));
        assert_eq!(table.transitions()[3].on, JobStatus::Error);
        assert!(table.is_step("a"));
        assert!(!table.is_step("START"));
    }
}
