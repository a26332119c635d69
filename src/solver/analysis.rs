//! Branch-current analysis pipeline.

use std::collections::BTreeMap;

use super::equations::{kcl_rows, kvl_rows, EquationRows};
use super::lu::LinearSystem;
use super::DEFAULT_PIVOT_TOLERANCE;
use crate::circuit::{reduce_series, BranchId, Circuit, NodeId};
use crate::error::{KirchhoffError, Result};
use crate::topology::{SpanningTree, Topology};

/// Configuration for [`Analyzer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Smallest acceptable pivot, after scaling each row by its largest entry.
    pub pivot_tolerance: f64,
    /// Run series reduction before building the tree.
    pub reduce_series: bool,
    /// Node held at 0 V and dropped from KCL. Lowest node id when unset.
    pub reference_node: Option<NodeId>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            reduce_series: false,
            reference_node: None,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pivot tolerance for row-scaled pivots.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Enable or disable series reduction.
    pub fn with_series_reduction(mut self, enabled: bool) -> Self {
        self.reduce_series = enabled;
        self
    }

    /// Pin the reference node.
    pub fn with_reference_node(mut self, node: NodeId) -> Self {
        self.reference_node = Some(node);
        self
    }
}

/// Result of one analysis pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    branch_ids: Vec<BranchId>,
    currents: Vec<f64>,
    voltages: BTreeMap<NodeId, f64>,
    reference: NodeId,
}

impl Solution {
    /// Branch currents in canonical branch order.
    pub fn currents(&self) -> &[f64] {
        &self.currents
    }

    /// Branch ids in canonical order, parallel to [`Solution::currents`].
    pub fn branch_ids(&self) -> &[BranchId] {
        &self.branch_ids
    }

    /// Current of branch `id`.
    pub fn current(&self, id: BranchId) -> Option<f64> {
        self.branch_ids
            .iter()
            .position(|b| *b == id)
            .map(|idx| self.currents[idx])
    }

    /// Potential of `node` relative to the reference node.
    pub fn voltage(&self, node: NodeId) -> Option<f64> {
        self.voltages.get(&node).copied()
    }

    /// All node potentials.
    pub fn voltages(&self) -> &BTreeMap<NodeId, f64> {
        &self.voltages
    }

    /// Node the potentials are measured against.
    pub fn reference(&self) -> NodeId {
        self.reference
    }
}

/// Runs reduction, decomposition, assembly and the linear solve.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: SolverConfig,
}

impl Analyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve `circuit` for its branch currents.
    ///
    /// Solved currents are written back onto the branches. Series
    /// reduction, when enabled, mutates the circuit first.
    pub fn solve(&self, circuit: &mut Circuit) -> Result<Solution> {
        if self.config.reduce_series {
            let protect: Vec<NodeId> = self.config.reference_node.into_iter().collect();
            reduce_series(circuit, &protect)?;
        }

        let reference = self.reference(circuit)?;
        if circuit.branch_count() == 1 {
            return solve_lone_branch(circuit, reference);
        }

        let topology = Topology::analyze(circuit).map_err(|e| {
            if let KirchhoffError::DisconnectedCircuit { reached, total } = &e {
                log::warn!("solve attempted on a disconnected circuit ({} of {} nodes reachable)", reached, total);
            }
            e
        })?;

        let system = self.assemble_with(circuit, &topology, reference)?;
        log::debug!(
            "solving {}x{} system ({} loops, {} constraints)",
            system.len(),
            system.columns,
            topology.loops.len(),
            topology.constrained.len()
        );

        let mut linear = LinearSystem::from_rows(&system)?;
        linear.factor(self.config.pivot_tolerance)?;
        let currents = linear.solve()?.to_vec();
        circuit.set_currents(&currents);

        let voltages = tree_voltages(circuit, &topology.tree, reference);
        Ok(Solution {
            branch_ids: circuit.branches().iter().map(|b| b.id).collect(),
            currents,
            voltages,
            reference,
        })
    }

    /// Build the stacked KCL/KVL system without solving it.
    pub fn assemble(&self, circuit: &Circuit) -> Result<EquationRows> {
        let reference = self.reference(circuit)?;
        let topology = Topology::analyze(circuit)?;
        self.assemble_with(circuit, &topology, reference)
    }

    fn assemble_with(&self, circuit: &Circuit, topology: &Topology, reference: NodeId) -> Result<EquationRows> {
        let system = kcl_rows(circuit, reference).stack(kvl_rows(circuit, topology)?);
        if !system.is_square() {
            return Err(KirchhoffError::DimensionMismatch {
                rows: system.len(),
                columns: system.columns,
            });
        }
        Ok(system)
    }

    fn reference(&self, circuit: &Circuit) -> Result<NodeId> {
        let automatic = circuit.reference_node().ok_or(KirchhoffError::EmptyCircuit)?;
        match self.config.reference_node {
            Some(node) if circuit.degree(node) == 0 => Err(KirchhoffError::topology(format!(
                "reference node {} is not part of the circuit",
                node
            ))),
            Some(node) => Ok(node),
            None => Ok(automatic),
        }
    }
}

/// The only branch of a circuit: Ohm's law, or the source's rating.
///
/// A two-terminal branch is closed on itself and reports the current its
/// sources deliver. A self-loop obeys `0 = R*I + E`, matching the sign the
/// assembled system gives the same loop before series reduction.
fn solve_lone_branch(circuit: &mut Circuit, reference: NodeId) -> Result<Solution> {
    let branch = &circuit.branches()[0];
    let delivered = match branch.rated_current() {
        Some(rated) => rated,
        None => {
            let resistance = branch.resistance();
            if resistance.is_infinite() {
                0.0
            } else if resistance == 0.0 {
                return Err(KirchhoffError::SingularMatrix);
            } else {
                branch.source_voltage() / resistance
            }
        }
    };
    let current = if branch.is_self_loop() { -delivered } else { delivered };
    log::debug!("lone branch {} solved directly: {}", branch.id, current);

    let voltages = circuit.nodes().into_iter().map(|n| (n, 0.0)).collect();
    let branch_ids = vec![branch.id];
    circuit.set_currents(&[current]);
    Ok(Solution {
        branch_ids,
        currents: vec![current],
        voltages,
        reference,
    })
}

/// Node potentials from a walk over the tree, starting at `reference`.
fn tree_voltages(circuit: &Circuit, tree: &SpanningTree, reference: NodeId) -> BTreeMap<NodeId, f64> {
    let mut voltages = BTreeMap::from([(reference, 0.0)]);
    let mut pending = vec![reference];

    while let Some(node) = pending.pop() {
        let v = voltages[&node];
        for &idx in tree.branches() {
            let branch = &circuit.branches()[idx];
            let Some(next) = branch.other_end(node) else {
                continue;
            };
            if voltages.contains_key(&next) {
                continue;
            }
            let Some(drop) = branch.voltage_drop() else {
                continue;
            };
            let v_next = if branch.first() == node { v - drop } else { v + drop };
            voltages.insert(next, v_next);
            pending.push(next);
        }
    }

    voltages
}

// ============ Analysis surface on Circuit ============

impl Circuit {
    /// KCL rows with the reference node dropped.
    pub fn kcl_matrix(&self) -> Result<EquationRows> {
        let reference = self.reference_node().ok_or(KirchhoffError::EmptyCircuit)?;
        Ok(kcl_rows(self, reference))
    }

    /// KVL rows followed by fixed-current constraint rows.
    pub fn kvl_matrix(&self) -> Result<EquationRows> {
        let topology = Topology::analyze(self)?;
        kvl_rows(self, &topology)
    }

    /// Solve with default configuration and return the current vector.
    pub fn solve_currents(&mut self) -> Result<Vec<f64>> {
        Analyzer::new().solve(self).map(|s| s.currents)
    }

    /// Node potentials of `solution`, keyed by display name.
    pub fn node_voltages(&self, solution: &Solution) -> Vec<(String, f64)> {
        solution
            .voltages()
            .iter()
            .map(|(node, v)| (self.node_name(*node), *v))
            .collect()
    }

    /// Name and reading of every instrument.
    pub fn instrument_readings(&self, solution: &Solution) -> Vec<(&str, Option<f64>)> {
        self.instruments()
            .iter()
            .map(|inst| (inst.name.as_str(), inst.reading(solution)))
            .collect()
    }
}
