//! Depth-first spanning tree construction.

use std::collections::BTreeSet;

use crate::circuit::{Branch, Circuit, NodeId};
use crate::error::{KirchhoffError, Result};

/// Check if a branch may be part of a spanning tree.
///
/// Branches with an externally fixed current (current sources, open
/// branches) are never tree branches, and neither are self-loops.
pub fn is_tree_eligible(branch: &Branch) -> bool {
    !branch.is_self_loop() && branch.fixed_current().is_none()
}

/// A spanning tree of the circuit graph.
///
/// Branches are stored as canonical column indices in the order the
/// traversal discovered them.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanningTree {
    root: NodeId,
    branches: Vec<usize>,
    in_tree: Vec<bool>,
    reached: BTreeSet<NodeId>,
}

impl SpanningTree {
    /// Build a tree by iterative depth-first search from the first branch's
    /// first endpoint.
    ///
    /// At each node the first eligible branch in canonical order leading to an
    /// unvisited node is taken and the current node is pushed as the place to
    /// return to. At a dead end the traversal pops back. It stops when the
    /// stack is exhausted, so the result covers exactly the nodes reachable
    /// from the root through eligible branches.
    pub fn build(circuit: &Circuit) -> Result<Self> {
        let first = circuit.branches().first().ok_or(KirchhoffError::EmptyCircuit)?;
        let root = first.first();

        let mut in_tree = vec![false; circuit.branch_count()];
        let mut branches = Vec::new();
        let mut reached = BTreeSet::from([root]);
        let mut backtrack = Vec::new();
        let mut current = root;

        loop {
            let step = circuit.branches().iter().enumerate().find_map(|(idx, branch)| {
                if !is_tree_eligible(branch) {
                    return None;
                }
                branch
                    .other_end(current)
                    .filter(|next| !reached.contains(next))
                    .map(|next| (idx, next))
            });

            match step {
                Some((idx, next)) => {
                    log::trace!("tree: {} -> {} via {}", current, next, circuit.branches()[idx].id);
                    in_tree[idx] = true;
                    branches.push(idx);
                    reached.insert(next);
                    backtrack.push(current);
                    current = next;
                }
                None => match backtrack.pop() {
                    Some(previous) => current = previous,
                    None => break,
                },
            }
        }

        Ok(Self {
            root,
            branches,
            in_tree,
            reached,
        })
    }

    /// Node the traversal started from.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Tree branch indices in discovery order.
    pub fn branches(&self) -> &[usize] {
        &self.branches
    }

    /// Number of tree branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Check if the tree has no branches.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Check if the branch at canonical index `idx` is a tree branch.
    pub fn contains(&self, idx: usize) -> bool {
        self.in_tree.get(idx).copied().unwrap_or(false)
    }

    /// Nodes covered by the tree.
    pub fn reached(&self) -> &BTreeSet<NodeId> {
        &self.reached
    }

    /// Check if the tree covers every node of `circuit`.
    pub fn is_spanning(&self, circuit: &Circuit) -> bool {
        self.reached.len() == circuit.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_circuit_is_an_error() {
        assert!(matches!(
            SpanningTree::build(&Circuit::new()),
            Err(KirchhoffError::EmptyCircuit)
        ));
    }

    #[test]
    fn test_triangle_tree() {
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(1.0, NodeId(2), NodeId(3)).unwrap();
        c.add_resistor(1.0, NodeId(3), NodeId(1)).unwrap();

        let tree = SpanningTree::build(&c).unwrap();
        assert_eq!(tree.root(), NodeId(1));
        assert_eq!(tree.branches(), &[0, 1]);
        assert!(!tree.contains(2));
        assert!(tree.is_spanning(&c));
    }

    #[test]
    fn test_backtracking_takes_first_branch_in_order() {
        // Star around node 1 plus a tail 3 - 4
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(1.0, NodeId(1), NodeId(3)).unwrap();
        c.add_resistor(1.0, NodeId(3), NodeId(4)).unwrap();
        c.add_resistor(1.0, NodeId(4), NodeId(1)).unwrap();

        let tree = SpanningTree::build(&c).unwrap();
        // 1 -> 2 dead end, back to 1, 1 -> 3 -> 4, 4 -> 1 already visited
        assert_eq!(tree.branches(), &[0, 1, 2]);
        assert_eq!(tree.len(), c.node_count() - 1);
    }

    #[test]
    fn test_current_source_and_self_loop_excluded() {
        let mut c = Circuit::new();
        c.add_current_source(1.0, f64::INFINITY, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(1.0, NodeId(1), NodeId(1)).unwrap();
        c.add_resistor(2.0, NodeId(2), NodeId(1)).unwrap();

        let tree = SpanningTree::build(&c).unwrap();
        assert_eq!(tree.branches(), &[2]);
        assert!(!tree.contains(0));
        assert!(!tree.contains(1));
    }

    #[test]
    fn test_open_branch_excluded() {
        let mut c = Circuit::new();
        c.add_voltmeter(f64::INFINITY, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(2.0, NodeId(1), NodeId(2)).unwrap();

        let tree = SpanningTree::build(&c).unwrap();
        assert_eq!(tree.branches(), &[1]);
    }

    #[test]
    fn test_unreachable_nodes_not_spanned() {
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(1.0, NodeId(3), NodeId(4)).unwrap();

        let tree = SpanningTree::build(&c).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_spanning(&c));
    }
}
