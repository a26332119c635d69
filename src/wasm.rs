//! WASM bindings for Kirchhoff Core.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuit } from 'kirchhoff_core';
//!
//! await init();
//!
//! const circuit = new WasmCircuit(`
//!   V1 in 0 10
//!   R1 in mid 2
//!   R2 mid 0 3
//! `);
//!
//! const currents = circuit.solve();      // Float64Array
//! const vMid = circuit.node_voltage("mid");
//! const i0 = circuit.branch_current(0);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{validate_circuit, Circuit};
use crate::dsl;
use crate::error::KirchhoffError;
use crate::solver::{Analyzer, Solution, SolverConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: KirchhoffError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A netlist-defined circuit that can be solved from JavaScript.
#[wasm_bindgen]
pub struct WasmCircuit {
    circuit: Circuit,
    config: SolverConfig,
    solution: Option<Solution>,
}

#[wasm_bindgen]
impl WasmCircuit {
    /// Parse and build a circuit from netlist text.
    ///
    /// Fails with the error message if the netlist is malformed or the
    /// circuit is empty or disconnected.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmCircuit, JsValue> {
        let net = dsl::load(netlist).map_err(to_js)?;
        validate_circuit(&net.circuit).map_err(to_js)?;
        Ok(WasmCircuit {
            circuit: net.circuit,
            config: net.config,
            solution: None,
        })
    }

    /// Solve for branch currents, in branch order.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<Vec<f64>, JsValue> {
        let solution = Analyzer::with_config(self.config.clone())
            .solve(&mut self.circuit)
            .map_err(to_js)?;
        let currents = solution.currents().to_vec();
        self.solution = Some(solution);
        Ok(currents)
    }

    /// Number of branches (after any reduction performed by `solve`).
    #[wasm_bindgen]
    pub fn branch_count(&self) -> usize {
        self.circuit.branch_count()
    }

    /// Current of the branch at `index` from the last solve.
    #[wasm_bindgen]
    pub fn branch_current(&self, index: usize) -> Result<f64, JsValue> {
        let solution = self.solution.as_ref().ok_or_else(|| {
            to_js(KirchhoffError::WasmError {
                message: "circuit has not been solved".to_string(),
            })
        })?;
        solution.currents().get(index).copied().ok_or_else(|| {
            to_js(KirchhoffError::WasmError {
                message: format!("branch index {} out of range", index),
            })
        })
    }

    /// Potential of a named node from the last solve.
    ///
    /// Returns `undefined` before `solve` or for an unknown node.
    #[wasm_bindgen]
    pub fn node_voltage(&self, node_name: &str) -> Option<f64> {
        let solution = self.solution.as_ref()?;
        let node = if crate::dsl::is_ground_name(node_name) {
            crate::GROUND
        } else {
            self.circuit.find_node(node_name)?
        };
        solution.voltage(node)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
