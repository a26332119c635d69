//! # Kirchhoff Core
//!
//! Steady-state branch currents of resistive networks with ideal sources.
//!
//! This library provides:
//! - A circuit graph of branches between integer-identified nodes
//! - Spanning tree, co-tree and fundamental loop decomposition
//! - KCL/KVL assembly and an LU solve for every branch current
//! - Series reduction of degree-2 nodes
//! - A SPICE-like netlist format and voltmeter/ammeter readings
//!
//! ## Architecture
//!
//! - [`circuit`] - Branches, nodes, construction and series reduction
//! - [`components`] - Resistors, sources and instruments
//! - [`topology`] - Spanning tree, co-tree and fundamental loops
//! - [`solver`] - Equation assembly, LU solve and node potentials
//! - [`dsl`] - Netlist parser
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! kirchhoff divider.net --matrices
//! ```
//!
//! ### Library
//!
//! ```
//! use kirchhoff_core::{Analyzer, Circuit, NodeId};
//!
//! let mut circuit = Circuit::new();
//! circuit.add_voltage_source(10.0, 0.0, NodeId(1), NodeId(0))?;
//! circuit.add_resistor(2.0, NodeId(1), NodeId(2))?;
//! circuit.add_resistor(3.0, NodeId(2), NodeId(0))?;
//!
//! let solution = Analyzer::new().solve(&mut circuit)?;
//! assert!((solution.voltage(NodeId(2)).unwrap() - 6.0).abs() < 1e-9);
//! # Ok::<(), kirchhoff_core::KirchhoffError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuit } from 'kirchhoff_core';
//!
//! const circuit = new WasmCircuit(netlist);
//! const currents = circuit.solve();
//! ```
//!
//! ## Method
//!
//! For a circuit with N nodes and B branches:
//!
//! 1. Optionally merge series branches through degree-2 nodes
//! 2. Grow a spanning tree (N - 1 branches) by depth-first search
//! 3. Close one fundamental loop per remaining free branch
//! 4. Stack N - 1 KCL rows, one KVL row per loop and one constraint row per
//!    current-source or open branch into a B x B system
//! 5. Solve by LU decomposition and derive node potentials along the tree

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;
pub mod topology;

// Re-export main types for convenience
pub use circuit::{BranchId, Circuit, NodeId};
pub use error::{KirchhoffError, Result};
pub use solver::{Analyzer, Solution, SolverConfig, DEFAULT_PIVOT_TOLERANCE};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuit;

/// The ground node.
pub const GROUND: NodeId = NodeId::GROUND;
