//! Circuit branches and the series merge of two branches.

use super::types::{BranchId, NodeId, Orientation};
use crate::components::Component;
use crate::error::{KirchhoffError, Result};

/// Relative tolerance when comparing current source ratings.
const CURRENT_MATCH_TOLERANCE: f64 = 1e-12;

fn same_current(a: f64, b: f64) -> bool {
    (a - b).abs() <= CURRENT_MATCH_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// An edge of the circuit graph.
///
/// The endpoint order carries sign meaning: the branch current is positive
/// when it flows from `nodes[0]` to `nodes[1]`, and every oriented component
/// on the branch is stored relative to that direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: BranchId,
    /// [first, second]
    pub nodes: [NodeId; 2],
    /// Elements in series on this branch
    pub components: Vec<Component>,
    /// Solved branch current (0 until solved)
    pub current: f64,
}

impl Branch {
    /// Create an empty branch (an ideal wire) between two nodes.
    pub fn new(id: BranchId, first: NodeId, second: NodeId) -> Self {
        Self {
            id,
            nodes: [first, second],
            components: Vec::new(),
            current: 0.0,
        }
    }

    /// Builder-style [`Branch::push`].
    pub fn with_component(mut self, component: Component) -> Result<Self> {
        self.push(component)?;
        Ok(self)
    }

    /// Add a component in series.
    ///
    /// A branch holds at most one distinct signed current rating; a second
    /// current source with a different rating is rejected.
    pub fn push(&mut self, component: Component) -> Result<()> {
        if let (Some(existing), Some(requested)) = (self.rated_current(), component.signed_current()) {
            if !same_current(existing, requested) {
                return Err(KirchhoffError::ConflictingCurrentSources {
                    branch: self.id.0,
                    existing,
                    requested,
                });
            }
        }
        self.components.push(component);
        Ok(())
    }

    /// First endpoint.
    pub fn first(&self) -> NodeId {
        self.nodes[0]
    }

    /// Second endpoint.
    pub fn second(&self) -> NodeId {
        self.nodes[1]
    }

    /// Both endpoints are the same node.
    pub fn is_self_loop(&self) -> bool {
        self.nodes[0] == self.nodes[1]
    }

    /// Check if `node` is one of the endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.nodes[0] == node || self.nodes[1] == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.nodes[0] == node {
            Some(self.nodes[1])
        } else if self.nodes[1] == node {
            Some(self.nodes[0])
        } else {
            None
        }
    }

    /// Aggregate resistance. Infinite if any resistor is ideally open.
    pub fn resistance(&self) -> f64 {
        self.components.iter().map(Component::resistance).sum()
    }

    /// Net source voltage relative to the branch orientation.
    pub fn source_voltage(&self) -> f64 {
        self.components.iter().map(Component::signed_voltage).sum()
    }

    /// Signed rated current of the branch's current source, if any.
    pub fn rated_current(&self) -> Option<f64> {
        self.components.iter().find_map(Component::signed_current)
    }

    /// Check if the branch holds an ideal current source.
    pub fn has_current_source(&self) -> bool {
        self.rated_current().is_some()
    }

    /// Branch is ideally open and holds no current source.
    pub fn is_open(&self) -> bool {
        !self.has_current_source() && self.resistance().is_infinite()
    }

    /// Current fixed independently of topology, if any.
    ///
    /// A current source pins the branch at minus its signed rating; an open
    /// branch carries nothing. Such branches never enter a spanning tree.
    pub fn fixed_current(&self) -> Option<f64> {
        match self.rated_current() {
            Some(rated) => Some(-rated),
            None if self.is_open() => Some(0.0),
            None => None,
        }
    }

    /// Voltage across the branch, `V(first) - V(second) = R*I + E`.
    ///
    /// Undefined (`None`) for open and current-source branches, whose voltage
    /// is set by the rest of the network.
    pub fn voltage_drop(&self) -> Option<f64> {
        if self.fixed_current().is_some() {
            return None;
        }
        Some(self.resistance() * self.current + self.source_voltage())
    }
}

/// Merge two branches meeting at a removed node into one series branch.
///
/// `dir_a` and `dir_b` give each branch's orientation relative to the merged
/// path, which runs from the far end of `a`, through the removed node, to the
/// far end of `b`. Components of a reversed side are flipped so the merged
/// branch holds them relative to its own orientation. The merged branch
/// keeps `a`'s id.
pub fn merge_oriented_edges(a: &Branch, dir_a: Orientation, b: &Branch, dir_b: Orientation) -> Result<Branch> {
    let start = match dir_a {
        Orientation::Forward => a.first(),
        Orientation::Reversed => a.second(),
    };
    let end = match dir_b {
        Orientation::Forward => b.second(),
        Orientation::Reversed => b.first(),
    };

    let mut merged = Branch::new(a.id, start, end);
    for component in &a.components {
        merged.push(component.clone().oriented(dir_a))?;
    }
    for component in &b.components {
        merged.push(component.clone().oriented(dir_b))?;
    }
    Ok(merged)
}
