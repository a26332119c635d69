//! Series reduction: merge the two branches of every degree-2 node.

use std::collections::BTreeSet;

use super::branch::merge_oriented_edges;
use super::graph::Circuit;
use super::types::{NodeId, Orientation};
use crate::components::InstrumentKind;
use crate::error::Result;

/// Repeatedly merge branches in series until no reducible node remains.
///
/// A node is reducible when exactly two branches meet there, neither of them
/// is a self-loop, and the node is not protected. The reference node, every
/// voltmeter terminal, and the nodes in `protect` are protected. Ammeters
/// need no protection: a series merge preserves the current they read, so
/// they are moved onto the merged branch. Returns the
/// number of merges performed. Must run before any tree or loop construction.
pub fn reduce_series(circuit: &mut Circuit, protect: &[NodeId]) -> Result<usize> {
    let mut protected: BTreeSet<NodeId> = protect.iter().copied().collect();
    protected.extend(circuit.reference_node());
    for inst in circuit.instruments() {
        if inst.kind == InstrumentKind::Voltmeter {
            protected.extend(inst.nodes);
        }
    }

    let mut merges = 0;
    while let Some(node) = circuit
        .nodes()
        .into_iter()
        .find(|n| !protected.contains(n) && is_reducible(circuit, *n))
    {
        merge_at(circuit, node)?;
        merges += 1;
    }

    log::debug!(
        "series reduction: {} merges, {} branches / {} nodes remain",
        merges,
        circuit.branch_count(),
        circuit.node_count()
    );
    Ok(merges)
}

fn is_reducible(circuit: &Circuit, node: NodeId) -> bool {
    let incident = circuit.branches_incident_to(node);
    incident.len() == 2 && incident.iter().all(|b| !b.is_self_loop())
}

fn merge_at(circuit: &mut Circuit, node: NodeId) -> Result<()> {
    let mut positions = circuit
        .branches()
        .iter()
        .enumerate()
        .filter(|(_, b)| b.touches(node))
        .map(|(i, _)| i);
    let (Some(ia), Some(ib)) = (positions.next(), positions.next()) else {
        return Ok(());
    };

    let a = &circuit.branches()[ia];
    let b = &circuit.branches()[ib];

    // Path runs from a's far end through `node` to b's far end
    let dir_a = if a.second() == node {
        Orientation::Forward
    } else {
        Orientation::Reversed
    };
    let dir_b = if b.first() == node {
        Orientation::Forward
    } else {
        Orientation::Reversed
    };

    let merged = merge_oriented_edges(a, dir_a, b, dir_b)?;
    log::trace!("merged {} and {} through {} into {} -> {}", a.id, b.id, node, merged.first(), merged.second());
    circuit.replace_merged(ia, dir_a, merged, ib, dir_b);
    Ok(())
}
