//! Circuit validation.

use std::collections::BTreeSet;

use crate::error::{KirchhoffError, Result};

use super::Circuit;

/// Validate a circuit for analysis.
///
/// Checks:
/// - The circuit has at least one branch
/// - Branch ids are unique
/// - Every node is reachable from every other through some branch
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    if circuit.is_empty() {
        return Err(KirchhoffError::EmptyCircuit);
    }

    let mut ids = BTreeSet::new();
    for branch in circuit.branches() {
        if !ids.insert(branch.id) {
            return Err(KirchhoffError::DuplicateBranch { id: branch.id.0 });
        }
    }

    let nodes = circuit.nodes();
    let start = circuit.branches()[0].first();
    let mut reached = BTreeSet::from([start]);
    let mut frontier = vec![start];
    while let Some(node) = frontier.pop() {
        for branch in circuit.branches_incident_to(node) {
            if let Some(next) = branch.other_end(node) {
                if reached.insert(next) {
                    frontier.push(next);
                }
            }
        }
    }

    if reached.len() != nodes.len() {
        return Err(KirchhoffError::DisconnectedCircuit {
            reached: reached.len(),
            total: nodes.len(),
        });
    }

    Ok(())
}
