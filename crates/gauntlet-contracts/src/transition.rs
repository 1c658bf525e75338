//! Graph nodes, transition rules, and the snapshot maps they are evaluated against.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::{JobStatus, Outcome};

/// The virtual label every submission starts from.
pub const START: &str = "START";
/// Terminal label for a successful submission.
pub const SUCCESS: &str = "SUCCESS";
/// Terminal label for a failed submission.
pub const FAILED: &str = "FAILED";
/// Terminal label for an errored submission.
pub const ERROR: &str = "ERROR";

/// Labels that may never be used as step names.
pub const RESERVED_LABELS: [&str; 4] = [START, SUCCESS, FAILED, ERROR];

/// A raw status snapshot as delivered by the orchestration layer.
///
/// Keys are step names (or `START`), values are status strings. May contain
/// unknown keys and invalid or transient statuses.
pub type RawStatus = BTreeMap<String, String>;

/// A sanitized snapshot: keys are `START` or declared steps, values are one
/// of `evaluating`, `success`, `failed`, `error`.
pub type StatusSnapshot = BTreeMap<String, JobStatus>;

/// Per-step version counters used for staleness checks.
pub type AgeMap = BTreeMap<String, u64>;

/// A vertex of the step graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// The virtual start label. Only valid on the source side of a transition.
    Start,
    /// A declared step.
    Step(String),
    /// A terminal outcome. Only valid on the target side of a transition.
    Terminal(Outcome),
}

impl Node {
    /// Build a step node.
    pub fn step(name: impl Into<String>) -> Self {
        Node::Step(name.into())
    }

    /// The label this node carries in snapshots and configuration.
    pub fn as_str(&self) -> &str {
        match self {
            Node::Start => START,
            Node::Step(name) => name,
            Node::Terminal(outcome) => outcome.terminal_label(),
        }
    }

    /// The outcome if this node is a terminal label.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Node::Terminal(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule: when `from` reports `on`, activate `to`.
///
/// `to` is either a step to (re)activate or a terminal outcome to declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Node,
    pub on: JobStatus,
    pub to: Node,
}

impl Transition {
    pub fn new(from: Node, on: JobStatus, to: Node) -> Self {
        Self { from, on, to }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --{}--> {}", self.from, self.on, self.to)
    }
}

/// A transition as it appears in declarative configuration: three strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRow {
    pub from: String,
    pub on: String,
    pub to: String,
}

impl TransitionRow {
    pub fn new(from: impl Into<String>, on: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            on: on.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for TransitionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.on, self.to)
    }
}
