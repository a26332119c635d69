//! Core types for circuit representation.

use std::fmt;

use crate::error::{KirchhoffError, Result};

/// A unique identifier for a node in the circuit.
/// Node 0 is ground when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for NodeId {
    type Error = KirchhoffError;

    fn try_from(id: i64) -> Result<Self> {
        usize::try_from(id)
            .map(NodeId)
            .map_err(|_| KirchhoffError::NegativeId { id })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// A unique identifier for a branch in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

impl TryFrom<i64> for BranchId {
    type Error = KirchhoffError;

    fn try_from(id: i64) -> Result<Self> {
        usize::try_from(id)
            .map(BranchId)
            .map_err(|_| KirchhoffError::NegativeId { id })
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Direction of an element or edge relative to a reference direction.
///
/// For a component this is relative to the branch that owns it; for an edge
/// being merged in series reduction it is relative to the merged path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Same direction as the reference.
    #[default]
    Forward,
    /// Opposite direction to the reference.
    Reversed,
}

impl Orientation {
    /// The opposite orientation.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }

    /// +1.0 for forward, -1.0 for reversed.
    pub fn sign(self) -> f64 {
        match self {
            Orientation::Forward => 1.0,
            Orientation::Reversed => -1.0,
        }
    }

    /// Compose two orientations (reversed twice is forward).
    pub fn compose(self, other: Orientation) -> Self {
        if self == other {
            Orientation::Forward
        } else {
            Orientation::Reversed
        }
    }
}
