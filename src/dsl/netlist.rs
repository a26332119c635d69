//! Build a [`Circuit`] from a parsed netlist.

use std::collections::HashMap;

use super::ast::CircuitAst;
use crate::circuit::{Circuit, NodeId};
use crate::components::Device;
use crate::error::{KirchhoffError, Result};
use crate::solver::SolverConfig;

/// A circuit together with the analysis options its directives requested.
#[derive(Debug, Clone)]
pub struct Netlist {
    pub circuit: Circuit,
    pub config: SolverConfig,
}

impl Netlist {
    /// Lower an AST into a circuit.
    ///
    /// Integer node names keep their value as id, `0` being ground. Other
    /// names get fresh ids above the largest integer used, in order of first
    /// appearance. Wires are applied after all devices are placed.
    pub fn from_ast(ast: &CircuitAst) -> Result<Self> {
        let mut ids = assign_node_ids(&ast.nodes)?;

        let mut circuit = Circuit::new();
        for (name, id) in &ids {
            if !id.is_ground() {
                circuit.set_node_name(*id, name.clone());
            }
        }

        for def in &ast.components {
            let device = Device::from_def(def)?;
            let a = lookup(&ids, &def.nodes[0])?;
            let b = lookup(&ids, &def.nodes[1])?;
            circuit.add_device(def.name.clone(), device, a, b)?;
        }

        for wire in &ast.wires {
            let a = lookup(&ids, &wire.nodes[0])?;
            let b = lookup(&ids, &wire.nodes[1])?;
            circuit.connect_nodes(a, b);
            let (keep, gone) = if a < b { (a, b) } else { (b, a) };
            for id in ids.values_mut() {
                if *id == gone {
                    *id = keep;
                }
            }
        }

        let mut config = SolverConfig::new().with_series_reduction(ast.reduce);
        if let Some(ground) = &ast.ground {
            config = config.with_reference_node(lookup(&ids, ground)?);
        }

        log::debug!(
            "built circuit: {} branches, {} nodes, {} instruments",
            circuit.branch_count(),
            circuit.node_count(),
            circuit.instruments().len()
        );
        Ok(Self { circuit, config })
    }
}

fn assign_node_ids(names: &[String]) -> Result<HashMap<String, NodeId>> {
    let mut ids = HashMap::new();
    let mut highest = 0;

    for name in names {
        if let Ok(raw) = name.parse::<i64>() {
            let id = NodeId::try_from(raw)?;
            highest = highest.max(id.0);
            ids.insert(name.clone(), id);
        }
    }

    let mut next = highest + 1;
    for name in names {
        if !ids.contains_key(name) {
            ids.insert(name.clone(), NodeId(next));
            next += 1;
        }
    }

    Ok(ids)
}

fn lookup(ids: &HashMap<String, NodeId>, name: &str) -> Result<NodeId> {
    ids.get(name)
        .copied()
        .ok_or_else(|| KirchhoffError::topology(format!("node '{}' was never declared", name)))
}

#[cfg(test)]
mod tests {
    use super::super::load;
    use super::*;
    use crate::solver::Analyzer;
    use approx::assert_relative_eq;

    #[test]
    fn test_integer_names_keep_their_id() {
        let net = load("R1 3 0 1\nR2 3 out 1\nR2b out 7 1\n").unwrap();
        let c = &net.circuit;
        assert_eq!(c.nodes(), vec![NodeId(0), NodeId(3), NodeId(7), NodeId(8)]);
        assert_eq!(c.find_node("out"), Some(NodeId(8)));
        assert_eq!(c.node_name(NodeId(3)), "3");
    }

    #[test]
    fn test_negative_node_rejected() {
        assert!(matches!(
            load("R1 -2 0 1"),
            Err(KirchhoffError::NegativeId { id: -2 })
        ));
    }

    #[test]
    fn test_construction_errors_surface() {
        assert!(matches!(
            load("R1 a 0 -5"),
            Err(KirchhoffError::NegativeResistance { .. })
        ));
        assert!(matches!(
            load("V1 a 0 5 r=inf"),
            Err(KirchhoffError::InvalidInternalResistance { .. })
        ));
        assert!(matches!(
            load("R1 a 0 1\nR1 a 0 2"),
            Err(KirchhoffError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn test_wire_merges_nodes() {
        let net = load("V1 a 0 10\nR1 a b 2\nR2 c 0 3\n.wire b c\n").unwrap();
        let c = &net.circuit;
        assert_eq!(c.node_count(), 3);
        let b = c.branches()[1].second();
        assert_eq!(c.branches()[2].first(), b);
    }

    #[test]
    fn test_directives_configure_solver() {
        let net = load(".reduce\n.ground mid\nV1 top 0 10\nR1 top mid 2\nR2 mid 0 3\n").unwrap();
        assert!(net.config.reduce_series);
        assert_eq!(net.config.reference_node, net.circuit.find_node("mid"));
    }

    #[test]
    fn test_divider_end_to_end() {
        let text = "\
# 10 V across 2 + 3 ohms
V1 in 0 10
AM1 in top
R1 top mid 2
R2 mid gnd 3
VM1 mid 0
";
        let mut net = load(text).unwrap();
        let solution = Analyzer::with_config(net.config.clone())
            .solve(&mut net.circuit)
            .unwrap();

        let readings = net.circuit.instrument_readings(&solution);
        assert_eq!(readings[0].0, "AM1");
        assert_relative_eq!(readings[0].1.unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(readings[1].0, "VM1");
        assert_relative_eq!(readings[1].1.unwrap(), 6.0, epsilon = 1e-12);

        let mid = net.circuit.find_node("mid").unwrap();
        assert_relative_eq!(solution.voltage(mid).unwrap(), 6.0, epsilon = 1e-12);
    }
}
