//! Circuit graph representation and validation.
//!
//! This module provides the branch-list representation of a circuit. The
//! [`Circuit`] struct holds the ordered branches, answers adjacency queries
//! over them, and offers the construction surface (resistors, sources,
//! instruments). Series reduction rewrites the branch list in place.

mod branch;
mod graph;
mod reduce;
mod types;
mod validate;

pub use branch::{merge_oriented_edges, Branch};
pub use graph::Circuit;
pub use reduce::reduce_series;
pub use types::*;
pub use validate::validate_circuit;
