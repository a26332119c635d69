//! Measuring instruments: Voltmeter, Ammeter.
//!
//! An instrument is modelled by the resistor branch it injects into the
//! circuit. The record kept here associates the instrument with that branch
//! so a reading can be taken from a solution.

use crate::circuit::{BranchId, NodeId, Orientation};
use crate::solver::Solution;

/// Kind of measuring instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    /// Reads the potential difference between its terminals
    Voltmeter,
    /// Reads the current through its own branch
    Ammeter,
}

impl InstrumentKind {
    /// Unit of the reading.
    pub fn unit(&self) -> &'static str {
        match self {
            InstrumentKind::Voltmeter => "V",
            InstrumentKind::Ammeter => "A",
        }
    }
}

/// An instrument attached to the circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub name: String,
    pub kind: InstrumentKind,
    /// Branch holding the instrument's internal resistance
    pub branch: BranchId,
    /// Terminals as declared: [positive, negative]
    pub nodes: [NodeId; 2],
    /// Direction of the terminals relative to the branch
    pub orientation: Orientation,
}

impl Instrument {
    /// Create a new instrument on `branch`, declared from `nodes[0]` to `nodes[1]`.
    pub fn new(name: impl Into<String>, kind: InstrumentKind, branch: BranchId, nodes: [NodeId; 2]) -> Self {
        Self {
            name: name.into(),
            kind,
            branch,
            nodes,
            orientation: Orientation::Forward,
        }
    }

    /// Take a reading from a solved circuit.
    ///
    /// Returns `None` when the solution no longer covers the instrument's
    /// branch or terminals.
    pub fn reading(&self, solution: &Solution) -> Option<f64> {
        match self.kind {
            InstrumentKind::Voltmeter => {
                let v_pos = solution.voltage(self.nodes[0])?;
                let v_neg = solution.voltage(self.nodes[1])?;
                Some(v_pos - v_neg)
            }
            InstrumentKind::Ammeter => solution
                .current(self.branch)
                .map(|i| self.orientation.sign() * i),
        }
    }
}
