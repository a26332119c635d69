//! Circuit graph structure.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::branch::Branch;
use super::types::{BranchId, NodeId, Orientation};
use crate::components::{Component, CurrentSource, Device, Instrument, InstrumentKind, Resistor, VoltageSource};
use crate::error::{KirchhoffError, Result};

/// A circuit: an ordered collection of branches.
///
/// Branch order is the canonical column order of every equation matrix.
/// Nodes are not stored; the node set is the distinct union of branch
/// endpoints and is recomputed on demand.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    branches: Vec<Branch>,
    instruments: Vec<Instrument>,
    node_names: BTreeMap<NodeId, String>,
    component_names: HashSet<String>,
    name_counters: HashMap<&'static str, usize>,
    next_branch_id: usize,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from pre-built branches, keeping their order.
    pub fn from_branches(branches: Vec<Branch>) -> Result<Self> {
        let mut circuit = Self::new();
        for branch in branches {
            circuit.add_branch(branch)?;
        }
        Ok(circuit)
    }

    // ============ Queries ============

    /// All branches in canonical order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Look up a branch by id.
    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Canonical column index of a branch.
    pub fn branch_index(&self, id: BranchId) -> Option<usize> {
        self.branches.iter().position(|b| b.id == id)
    }

    /// Number of branches.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Check if the circuit has no branches.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Distinct nodes referenced by any branch, in ascending id order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.branches
            .iter()
            .flat_map(|b| b.nodes)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Branches whose first or second endpoint is `node`, in canonical order.
    ///
    /// Parallel branches are all listed; a self-loop is listed once.
    pub fn branches_incident_to(&self, node: NodeId) -> Vec<&Branch> {
        self.branches.iter().filter(|b| b.touches(node)).collect()
    }

    /// Number of branches incident to `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.branches.iter().filter(|b| b.touches(node)).count()
    }

    /// The node whose KCL row is dropped: ground when present, otherwise the
    /// lowest node id.
    pub fn reference_node(&self) -> Option<NodeId> {
        self.branches.iter().flat_map(|b| b.nodes).min()
    }

    /// Attached instruments.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Solved branch currents in canonical order.
    pub fn currents(&self) -> Vec<f64> {
        self.branches.iter().map(|b| b.current).collect()
    }

    /// Give a node a display name.
    pub fn set_node_name(&mut self, node: NodeId, name: impl Into<String>) {
        self.node_names.insert(node, name.into());
    }

    /// Display name of a node (its id when unnamed).
    pub fn node_name(&self, node: NodeId) -> String {
        self.node_names
            .get(&node)
            .cloned()
            .unwrap_or_else(|| node.to_string())
    }

    /// Find a node by display name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
    }

    // ============ Construction ============

    /// Add a resistor between `a` and `b`.
    pub fn add_resistor(&mut self, resistance: f64, a: NodeId, b: NodeId) -> Result<BranchId> {
        let name = self.generate_name("R");
        self.add_device(name, Device::Resistor { resistance }, a, b)
    }

    /// Add a voltage source with its positive terminal at `a`.
    pub fn add_voltage_source(
        &mut self,
        voltage: f64,
        internal_resistance: f64,
        a: NodeId,
        b: NodeId,
    ) -> Result<BranchId> {
        let name = self.generate_name("V");
        self.add_device(
            name,
            Device::VoltageSource {
                voltage,
                internal_resistance,
            },
            a,
            b,
        )
    }

    /// Add a current source driving `current` out of `a` into the network.
    ///
    /// Returns the id of the ideal source branch. A finite internal resistance
    /// is added as a separate resistor branch between the same nodes.
    pub fn add_current_source(
        &mut self,
        current: f64,
        internal_resistance: f64,
        a: NodeId,
        b: NodeId,
    ) -> Result<BranchId> {
        let name = self.generate_name("I");
        self.add_device(
            name,
            Device::CurrentSource {
                current,
                internal_resistance,
            },
            a,
            b,
        )
    }

    /// Add a voltmeter reading `V(a) - V(b)`.
    pub fn add_voltmeter(&mut self, internal_resistance: f64, a: NodeId, b: NodeId) -> Result<BranchId> {
        let name = self.generate_name("VM");
        self.add_device(name, Device::Voltmeter { internal_resistance }, a, b)
    }

    /// Add an ammeter reading the current from `a` to `b`.
    pub fn add_ammeter(&mut self, internal_resistance: f64, a: NodeId, b: NodeId) -> Result<BranchId> {
        let name = self.generate_name("AM");
        self.add_device(name, Device::Ammeter { internal_resistance }, a, b)
    }

    /// Add a named device between `a` and `b`, returning its main branch.
    pub fn add_device(&mut self, name: impl Into<String>, device: Device, a: NodeId, b: NodeId) -> Result<BranchId> {
        let name = name.into();
        if self.component_names.contains(&name) {
            return Err(KirchhoffError::DuplicateComponent { name });
        }
        device.validate(&name)?;

        let id = self.allocate_branch_id();
        let mut branch = Branch::new(id, a, b);
        let mut parallel = None;

        match device {
            Device::Resistor { resistance } => {
                branch.push(Component::Resistor(Resistor::new(name.clone(), resistance)?))?;
            }
            Device::VoltageSource {
                voltage,
                internal_resistance,
            } => {
                branch.push(Component::VoltageSource(VoltageSource::new(
                    name.clone(),
                    voltage,
                    Orientation::Forward,
                )?))?;
                if internal_resistance > 0.0 {
                    branch.push(Component::Resistor(Resistor::new(
                        format!("{}.r", name),
                        internal_resistance,
                    )?))?;
                }
            }
            Device::CurrentSource {
                current,
                internal_resistance,
            } => {
                branch.push(Component::CurrentSource(CurrentSource::new(
                    name.clone(),
                    current,
                    Orientation::Forward,
                )?))?;
                if internal_resistance.is_finite() {
                    parallel = Some(Resistor::new(format!("{}.r", name), internal_resistance)?);
                }
            }
            Device::Voltmeter { internal_resistance } | Device::Ammeter { internal_resistance } => {
                branch.push(Component::Resistor(Resistor::new(name.clone(), internal_resistance)?))?;
                let kind = if matches!(device, Device::Voltmeter { .. }) {
                    InstrumentKind::Voltmeter
                } else {
                    InstrumentKind::Ammeter
                };
                self.instruments.push(Instrument::new(name.clone(), kind, id, [a, b]));
            }
        }

        self.branches.push(branch);
        if let Some(resistor) = parallel {
            let parallel_id = self.allocate_branch_id();
            let parallel_branch = Branch::new(parallel_id, a, b).with_component(Component::Resistor(resistor))?;
            self.branches.push(parallel_branch);
        }

        log::trace!("added {} on {} between {} and {}", name, id, a, b);
        self.component_names.insert(name);
        Ok(id)
    }

    /// Insert a pre-built branch at the end of the canonical order.
    pub fn add_branch(&mut self, branch: Branch) -> Result<()> {
        if self.branch(branch.id).is_some() {
            return Err(KirchhoffError::DuplicateBranch { id: branch.id.0 });
        }
        self.next_branch_id = self.next_branch_id.max(branch.id.0 + 1);
        for component in &branch.components {
            self.component_names.insert(component.name().to_string());
        }
        self.branches.push(branch);
        Ok(())
    }

    /// Add a component in series to an existing branch.
    pub fn extend_branch(&mut self, id: BranchId, component: Component) -> Result<()> {
        let name = component.name().to_string();
        if self.component_names.contains(&name) {
            return Err(KirchhoffError::DuplicateComponent { name });
        }
        let branch = self
            .branches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(KirchhoffError::BranchNotFound { id: id.0 })?;
        branch.push(component)?;
        self.component_names.insert(name);
        Ok(())
    }

    /// Remove a branch by id. Instruments on that branch go with it.
    pub fn remove_branch(&mut self, id: BranchId) -> Result<Branch> {
        let index = self
            .branch_index(id)
            .ok_or(KirchhoffError::BranchNotFound { id: id.0 })?;
        let branch = self.branches.remove(index);
        self.instruments.retain(|inst| inst.branch != id);
        for component in &branch.components {
            self.component_names.remove(component.name());
        }
        Ok(branch)
    }

    /// Join two nodes with an ideal wire by merging them into the lower id.
    pub fn connect_nodes(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (keep, gone) = if a < b { (a, b) } else { (b, a) };
        for branch in &mut self.branches {
            for node in &mut branch.nodes {
                if *node == gone {
                    *node = keep;
                }
            }
        }
        for inst in &mut self.instruments {
            for node in &mut inst.nodes {
                if *node == gone {
                    *node = keep;
                }
            }
        }
        if let Some(name) = self.node_names.remove(&gone) {
            self.node_names.entry(keep).or_insert(name);
        }
    }

    // ============ Crate-internal mutation ============

    /// Replace the branch at `keep` with `merged` and drop the branch at `drop`.
    ///
    /// Ammeters on the dropped branch follow the current onto the merged one.
    pub(crate) fn replace_merged(
        &mut self,
        keep: usize,
        kept_dir: Orientation,
        merged: Branch,
        drop: usize,
        dropped_dir: Orientation,
    ) {
        let kept_id = self.branches[keep].id;
        let dropped_id = self.branches[drop].id;

        for inst in &mut self.instruments {
            if inst.branch == kept_id {
                inst.orientation = inst.orientation.compose(kept_dir);
            } else if inst.branch == dropped_id {
                inst.branch = kept_id;
                inst.orientation = inst.orientation.compose(dropped_dir);
            }
        }

        self.branches[keep] = merged;
        self.branches.remove(drop);
    }

    /// Write solved currents back onto the branches.
    pub(crate) fn set_currents(&mut self, currents: &[f64]) {
        for (branch, &current) in self.branches.iter_mut().zip(currents) {
            branch.current = current;
        }
    }

    fn allocate_branch_id(&mut self) -> BranchId {
        let id = BranchId(self.next_branch_id);
        self.next_branch_id += 1;
        id
    }

    fn generate_name(&mut self, prefix: &'static str) -> String {
        loop {
            let counter = self.name_counters.entry(prefix).or_insert(0);
            *counter += 1;
            let name = format!("{}{}", prefix, counter);
            if !self.component_names.contains(&name) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Circuit {
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(1.0, NodeId(2), NodeId(3)).unwrap();
        c.add_resistor(1.0, NodeId(3), NodeId(1)).unwrap();
        c
    }

    #[test]
    fn test_nodes_and_counts() {
        let c = triangle();
        assert_eq!(c.branch_count(), 3);
        assert_eq!(c.node_count(), 3);
        assert_eq!(c.nodes(), vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(c.reference_node(), Some(NodeId(1)));
    }

    #[test]
    fn test_incidence_with_parallel_and_self_loop() {
        let mut c = triangle();
        c.add_resistor(2.0, NodeId(2), NodeId(1)).unwrap();
        c.add_resistor(2.0, NodeId(2), NodeId(2)).unwrap();

        let incident: Vec<BranchId> = c.branches_incident_to(NodeId(2)).iter().map(|b| b.id).collect();
        assert_eq!(incident, vec![BranchId(0), BranchId(1), BranchId(3), BranchId(4)]);
        assert_eq!(c.degree(NodeId(2)), 4);
        assert_eq!(c.degree(NodeId(1)), 3);
        assert_eq!(c.degree(NodeId(9)), 0);
    }

    #[test]
    fn test_current_source_adds_parallel_branch() {
        let mut c = Circuit::new();
        let id = c.add_current_source(1.0, 100.0, NodeId(1), NodeId(0)).unwrap();
        assert_eq!(c.branch_count(), 2);
        assert!(c.branch(id).unwrap().has_current_source());
        assert_eq!(c.branches()[1].resistance(), 100.0);

        let ideal = c.add_current_source(1.0, f64::INFINITY, NodeId(2), NodeId(0)).unwrap();
        assert_eq!(c.branch_count(), 3);
        assert!(c.branch(ideal).unwrap().has_current_source());
    }

    #[test]
    fn test_voltage_source_internal_resistance_in_series() {
        let mut c = Circuit::new();
        let id = c.add_voltage_source(10.0, 5.0, NodeId(1), NodeId(0)).unwrap();
        let branch = c.branch(id).unwrap();
        assert_eq!(c.branch_count(), 1);
        assert_eq!(branch.resistance(), 5.0);
        assert_eq!(branch.source_voltage(), 10.0);
    }

    #[test]
    fn test_instruments_recorded() {
        let mut c = triangle();
        c.add_voltmeter(f64::INFINITY, NodeId(1), NodeId(2)).unwrap();
        c.add_ammeter(0.0, NodeId(3), NodeId(1)).unwrap();
        assert_eq!(c.instruments().len(), 2);
        assert_eq!(c.instruments()[0].name, "VM1");
        assert_eq!(c.instruments()[1].kind, InstrumentKind::Ammeter);
    }

    #[test]
    fn test_construction_errors() {
        let mut c = Circuit::new();
        assert!(matches!(
            c.add_resistor(-1.0, NodeId(1), NodeId(2)),
            Err(KirchhoffError::NegativeResistance { .. })
        ));
        assert!(c.is_empty());

        c.add_device("R1", Device::Resistor { resistance: 1.0 }, NodeId(1), NodeId(2))
            .unwrap();
        assert!(matches!(
            c.add_device("R1", Device::Resistor { resistance: 2.0 }, NodeId(2), NodeId(3)),
            Err(KirchhoffError::DuplicateComponent { .. })
        ));

        let dup = Branch::new(BranchId(0), NodeId(4), NodeId(5));
        assert!(matches!(c.add_branch(dup), Err(KirchhoffError::DuplicateBranch { id: 0 })));
    }

    #[test]
    fn test_generated_names_skip_taken() {
        let mut c = Circuit::new();
        c.add_device("R1", Device::Resistor { resistance: 1.0 }, NodeId(1), NodeId(2))
            .unwrap();
        c.add_resistor(1.0, NodeId(2), NodeId(3)).unwrap();
        assert_eq!(c.branches()[1].components[0].name(), "R2");
    }

    #[test]
    fn test_extend_branch_conflict() {
        let mut c = Circuit::new();
        let id = c.add_current_source(1.0, f64::INFINITY, NodeId(1), NodeId(0)).unwrap();
        let other = Component::CurrentSource(CurrentSource::new("I9", 2.0, Orientation::Forward).unwrap());
        assert!(matches!(
            c.extend_branch(id, other),
            Err(KirchhoffError::ConflictingCurrentSources { .. })
        ));
        let resistor = Component::Resistor(Resistor::new("R9", 3.0).unwrap());
        c.extend_branch(id, resistor).unwrap();
        assert_eq!(c.branch(id).unwrap().components.len(), 2);
    }

    #[test]
    fn test_remove_branch() {
        let mut c = triangle();
        c.add_ammeter(0.0, NodeId(3), NodeId(1)).unwrap();
        let removed = c.remove_branch(BranchId(3)).unwrap();
        assert_eq!(removed.nodes, [NodeId(3), NodeId(1)]);
        assert!(c.instruments().is_empty());
        assert!(matches!(
            c.remove_branch(BranchId(3)),
            Err(KirchhoffError::BranchNotFound { id: 3 })
        ));
    }

    #[test]
    fn test_connect_nodes() {
        let mut c = triangle();
        c.set_node_name(NodeId(3), "out");
        c.connect_nodes(NodeId(3), NodeId(2));
        assert_eq!(c.nodes(), vec![NodeId(1), NodeId(2)]);
        assert!(c.branches()[1].is_self_loop());
        assert_eq!(c.find_node("out"), Some(NodeId(2)));
    }
}
