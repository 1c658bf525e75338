//! The step graph: one edge per transition, `from -> to`.
//!
//! `START`, steps, and terminal labels are all ordinary vertices here. The
//! graph never changes after construction, so every ancestor set is computed
//! once up front and handed out by reference.

use std::collections::{BTreeMap, BTreeSet};

use gauntlet_contracts::transition::{Node, Transition};

static NO_ANCESTORS: BTreeSet<Node> = BTreeSet::new();

/// An immutable directed graph over the nodes named by a transition table.
#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    /// Forward edges: node → nodes it leads to.
    children: BTreeMap<Node, BTreeSet<Node>>,
    /// Transitive closure of reverse edges, excluding the node itself.
    ancestors: BTreeMap<Node, BTreeSet<Node>>,
}

impl StepGraph {
    /// Build the graph from a transition list.
    pub fn from_transitions(transitions: &[Transition]) -> Self {
        let mut children: BTreeMap<Node, BTreeSet<Node>> = BTreeMap::new();
        let mut parents: BTreeMap<Node, BTreeSet<Node>> = BTreeMap::new();

        for t in transitions {
            children.entry(t.from.clone()).or_default().insert(t.to.clone());
            children.entry(t.to.clone()).or_default();
            parents.entry(t.to.clone()).or_default().insert(t.from.clone());
            parents.entry(t.from.clone()).or_default();
        }

        let ancestors = parents
            .keys()
            .map(|node| (node.clone(), reverse_closure(&parents, node)))
            .collect();

        Self {
            children,
            ancestors,
        }
    }

    /// Every node with a path to `node`, excluding `node` itself.
    ///
    /// Nodes that are not in the graph have no ancestors.
    pub fn ancestors_of(&self, node: &Node) -> &BTreeSet<Node> {
        self.ancestors.get(node).unwrap_or(&NO_ANCESTORS)
    }

    /// All edges as `(from, to)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.children
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from, to)))
    }

    /// The first cycle found, as a closed path (`a, b, a`), or `None` for a DAG.
    pub fn find_cycle(&self) -> Option<Vec<Node>> {
        let mut done: BTreeSet<&Node> = BTreeSet::new();
        let mut path: Vec<&Node> = Vec::new();
        self.children
            .keys()
            .find_map(|root| self.visit(root, &mut path, &mut done))
    }

    fn visit<'a>(
        &'a self,
        node: &'a Node,
        path: &mut Vec<&'a Node>,
        done: &mut BTreeSet<&'a Node>,
    ) -> Option<Vec<Node>> {
        if let Some(pos) = path.iter().position(|n| *n == node) {
            let mut cycle: Vec<Node> = path[pos..].iter().map(|n| (*n).clone()).collect();
            cycle.push(node.clone());
            return Some(cycle);
        }
        if done.contains(node) {
            return None;
        }

        path.push(node);
        for child in self.children.get(node).into_iter().flatten() {
            if let Some(cycle) = self.visit(child, path, done) {
                return Some(cycle);
            }
        }
        path.pop();
        done.insert(node);
        None
    }
}

/// Iterative reverse DFS from `start`, excluding `start` itself.
fn reverse_closure(parents: &BTreeMap<Node, BTreeSet<Node>>, start: &Node) -> BTreeSet<Node> {
    let mut seen: BTreeSet<Node> = BTreeSet::new();
    let mut stack: Vec<&Node> = vec![start];

    while let Some(current) = stack.pop() {
        let Some(preds) = parents.get(current) else {
            continue;
        };
        for pred in preds {
            if pred != start && seen.insert(pred.clone()) {
                stack.push(pred);
            }
        }
    }

    seen
}

#[cfg(test)]
mod tests {
    use gauntlet_contracts::status::{JobStatus, Outcome};

    use super::*;

    fn t(from: Node, on: JobStatus, to: Node) -> Transition {
        Transition::new(from, on, to)
    }

    fn two_stage() -> Vec<Transition> {
        vec![
            t(Node::Start, JobStatus::Success, Node::step("a")),
            t(Node::step("a"), JobStatus::Success, Node::step("b")),
            t(Node::step("b"), JobStatus::Success, Node::Terminal(Outcome::Success)),
            t(Node::step("a"), JobStatus::Failed, Node::Terminal(Outcome::Failed)),
            t(Node::step("b"), JobStatus::Failed, Node::Terminal(Outcome::Failed)),
        ]
    }

    #[test]
    fn ancestors_follow_transitive_closure() {
        let graph = StepGraph::from_transitions(&two_stage());

        let b: Vec<&Node> = graph.ancestors_of(&Node::step("b")).iter().collect();
        assert_eq!(b, vec![&Node::Start, &Node::step("a")]);

        let success = graph.ancestors_of(&Node::Terminal(Outcome::Success));
        assert_eq!(success.len(), 3);
        assert!(success.contains(&Node::step("b")));
    }

    #[test]
    fn start_has_no_ancestors() {
        let graph = StepGraph::from_transitions(&two_stage());
        assert!(graph.ancestors_of(&Node::Start).is_empty());
    }

    #[test]
    fn unknown_node_has_no_ancestors() {
        let graph = StepGraph::from_transitions(&two_stage());
        assert!(graph.ancestors_of(&Node::step("lonely")).is_empty());
    }

    #[test]
    fn source_only_step_has_no_ancestors() {
        // `x` only ever appears on the source side.
        let graph = StepGraph::from_transitions(&[t(
            Node::step("x"),
            JobStatus::Success,
            Node::Terminal(Outcome::Success),
        )]);
        assert!(graph.ancestors_of(&Node::step("x")).is_empty());
    }

    #[test]
    fn diamond_is_not_cyclic() {
        let graph = StepGraph::from_transitions(&[
            t(Node::Start, JobStatus::Success, Node::step("a")),
            t(Node::Start, JobStatus::Success, Node::step("b")),
            t(Node::step("a"), JobStatus::Success, Node::step("c")),
            t(Node::step("b"), JobStatus::Success, Node::step("c")),
        ]);
        assert_eq!(graph.find_cycle(), None);

        let c = graph.ancestors_of(&Node::step("c"));
        assert_eq!(c.len(), 3, "c depends on START, a and b: {c:?}");
    }

    #[test]
    fn cycle_path_is_reported_and_closure_excludes_self() {
        let graph = StepGraph::from_transitions(&[
            t(Node::Start, JobStatus::Success, Node::step("a")),
            t(Node::step("a"), JobStatus::Success, Node::step("b")),
            t(Node::step("b"), JobStatus::Failed, Node::step("a")),
        ]);

        assert_eq!(
            graph.find_cycle(),
            Some(vec![Node::step("a"), Node::step("b"), Node::step("a")])
        );

        let a = graph.ancestors_of(&Node::step("a"));
        assert!(!a.contains(&Node::step("a")));
        assert!(a.contains(&Node::step("b")));
    }

    #[test]
    fn edges_mirror_transitions() {
        let graph = StepGraph::from_transitions(&two_stage());
        let edges: Vec<(&str, &str)> = graph
            .edges()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("START", "a"),
                ("a", "b"),
                ("a", "FAILED"),
                ("b", "SUCCESS"),
                ("b", "FAILED"),
            ]
        );
    }
}
