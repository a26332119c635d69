//! Graph decomposition of a circuit.
//!
//! Splits the branch set into three disjoint groups:
//! - the spanning tree (free currents determined by topology)
//! - the co-tree, each branch closing one fundamental loop
//! - constrained branches, whose current is fixed externally
//!
//! ```text
//! |tree| = #nodes - 1
//! |tree| + |co-tree| + |constrained| = #branches
//! ```

mod loops;
mod tree;

pub use loops::{co_tree, constrained_branches, fundamental_loops, FundamentalLoop};
pub use tree::{is_tree_eligible, SpanningTree};

use crate::circuit::Circuit;
use crate::error::{KirchhoffError, Result};

/// Tree, co-tree, constrained branches and fundamental loops of a circuit.
#[derive(Debug, Clone)]
pub struct Topology {
    pub tree: SpanningTree,
    pub co_tree: Vec<usize>,
    pub constrained: Vec<usize>,
    pub loops: Vec<FundamentalLoop>,
    pub node_count: usize,
}

impl Topology {
    /// Decompose `circuit`.
    ///
    /// Fails with [`KirchhoffError::EmptyCircuit`] on an empty circuit and
    /// with [`KirchhoffError::DisconnectedCircuit`] when the tree cannot
    /// reach every node.
    pub fn analyze(circuit: &Circuit) -> Result<Self> {
        let tree = SpanningTree::build(circuit)?;
        let node_count = circuit.node_count();
        if !tree.is_spanning(circuit) {
            return Err(KirchhoffError::DisconnectedCircuit {
                reached: tree.reached().len(),
                total: node_count,
            });
        }

        let co_tree = co_tree(circuit, &tree);
        let constrained = constrained_branches(circuit);
        let loops = fundamental_loops(circuit, &tree, &co_tree)?;

        log::debug!(
            "topology: {} nodes, {} tree, {} co-tree, {} constrained branches",
            node_count,
            tree.len(),
            co_tree.len(),
            constrained.len()
        );

        Ok(Self {
            tree,
            co_tree,
            constrained,
            loops,
            node_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NodeId;

    #[test]
    fn test_partition_counts() {
        let mut c = Circuit::new();
        c.add_voltage_source(10.0, 1.0, NodeId(1), NodeId(0)).unwrap();
        c.add_resistor(2.0, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(3.0, NodeId(2), NodeId(0)).unwrap();
        c.add_resistor(4.0, NodeId(2), NodeId(0)).unwrap();
        c.add_current_source(0.5, 50.0, NodeId(1), NodeId(2)).unwrap();
        c.add_voltmeter(f64::INFINITY, NodeId(1), NodeId(0)).unwrap();

        let topo = Topology::analyze(&c).unwrap();
        assert_eq!(topo.tree.len(), topo.node_count - 1);
        assert_eq!(topo.loops.len(), topo.co_tree.len());
        assert_eq!(
            topo.tree.len() + topo.co_tree.len() + topo.constrained.len(),
            c.branch_count()
        );
        // Current source branch and ideal voltmeter are constrained
        assert_eq!(topo.constrained, vec![4, 6]);
    }

    #[test]
    fn test_disconnected_reported() {
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(0), NodeId(1)).unwrap();
        c.add_resistor(1.0, NodeId(2), NodeId(3)).unwrap();
        assert!(matches!(
            Topology::analyze(&c),
            Err(KirchhoffError::DisconnectedCircuit { reached: 2, total: 4 })
        ));
    }

    #[test]
    fn test_current_source_only_node_is_disconnected() {
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(0), NodeId(1)).unwrap();
        c.add_current_source(1.0, f64::INFINITY, NodeId(1), NodeId(2)).unwrap();
        assert!(Topology::analyze(&c).unwrap_err().is_topology_error());
    }
}
