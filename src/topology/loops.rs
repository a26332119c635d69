//! Co-tree derivation and fundamental loop search.

use std::collections::{BTreeSet, HashMap};

use super::tree::SpanningTree;
use crate::circuit::{Circuit, NodeId};
use crate::error::{KirchhoffError, Result};

/// The cycle closed by one co-tree branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundamentalLoop {
    /// Canonical indices: the defining co-tree branch first, then the tree
    /// path from its first endpoint to its second, in traversal order.
    pub branches: Vec<usize>,
}

impl FundamentalLoop {
    /// The co-tree branch that defines this loop.
    pub fn defining_branch(&self) -> usize {
        self.branches[0]
    }

    /// Number of branches in the loop.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Always false; a loop holds at least its defining branch.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Check if the branch at canonical index `idx` is part of the loop.
    pub fn contains(&self, idx: usize) -> bool {
        self.branches.contains(&idx)
    }
}

/// Canonical indices of branches whose current is fixed externally.
pub fn constrained_branches(circuit: &Circuit) -> Vec<usize> {
    circuit
        .branches()
        .iter()
        .enumerate()
        .filter(|(_, b)| b.fixed_current().is_some())
        .map(|(idx, _)| idx)
        .collect()
}

/// Canonical indices of branches outside the tree, excluding constrained ones.
pub fn co_tree(circuit: &Circuit, tree: &SpanningTree) -> Vec<usize> {
    circuit
        .branches()
        .iter()
        .enumerate()
        .filter(|(idx, b)| !tree.contains(*idx) && b.fixed_current().is_none())
        .map(|(idx, _)| idx)
        .collect()
}

/// Find the fundamental loop of every co-tree branch, in co-tree order.
pub fn fundamental_loops(circuit: &Circuit, tree: &SpanningTree, co_tree: &[usize]) -> Result<Vec<FundamentalLoop>> {
    co_tree
        .iter()
        .map(|&idx| {
            let branch = &circuit.branches()[idx];
            let path = tree_path(circuit, tree, branch.first(), branch.second()).ok_or_else(|| {
                KirchhoffError::topology(format!(
                    "no tree path closes the loop of {} between {} and {}",
                    branch.id,
                    branch.first(),
                    branch.second()
                ))
            })?;

            let mut branches = Vec::with_capacity(path.len() + 1);
            branches.push(idx);
            branches.extend(path);
            Ok(FundamentalLoop { branches })
        })
        .collect()
}

/// Depth-first search over tree branches only, from `from` to `to`.
///
/// Uses the same discipline as the tree builder (first branch in canonical
/// order to an unvisited node, pop back at dead ends) and records a parent
/// pointer per discovered node, so the path is read back without any
/// shared traversal state.
fn tree_path(circuit: &Circuit, tree: &SpanningTree, from: NodeId, to: NodeId) -> Option<Vec<usize>> {
    let mut visited = BTreeSet::from([from]);
    let mut parent: HashMap<NodeId, (usize, NodeId)> = HashMap::new();
    let mut backtrack = Vec::new();
    let mut current = from;

    while current != to {
        let step = tree.branches().iter().copied().filter_map(|idx| {
            circuit.branches()[idx]
                .other_end(current)
                .filter(|next| !visited.contains(next))
                .map(|next| (idx, next))
        });
        // Canonical order, not discovery order
        match step.min_by_key(|(idx, _)| *idx) {
            Some((idx, next)) => {
                parent.insert(next, (idx, current));
                visited.insert(next);
                backtrack.push(current);
                current = next;
            }
            None => current = backtrack.pop()?,
        }
    }

    let mut path = Vec::new();
    let mut node = to;
    while node != from {
        let (idx, previous) = parent[&node];
        path.push(idx);
        node = previous;
    }
    path.reverse();
    Some(path)
}
