//! Error types for the Kirchhoff circuit solver.
//!
//! This module provides a unified error type [`KirchhoffError`] that covers
//! all error conditions that can occur while building a circuit, parsing a
//! netlist, decomposing the circuit graph, and solving for branch currents.

use thiserror::Error;

/// Result type alias using [`KirchhoffError`].
pub type Result<T> = std::result::Result<T, KirchhoffError>;

/// Unified error type for all Kirchhoff operations.
#[derive(Error, Debug)]
pub enum KirchhoffError {
    // ============ Construction Errors ============
    /// Resistance below zero
    #[error("Negative resistance {value} for component '{component}'")]
    NegativeResistance { component: String, value: f64 },

    /// Node or branch identifier below zero
    #[error("Negative identifier {id} is not allowed")]
    NegativeId { id: i64 },

    /// Value that is not a usable number (NaN, or infinite where finite is required)
    #[error("Invalid value {value} for component '{component}': {message}")]
    InvalidValue {
        component: String,
        value: f64,
        message: String,
    },

    /// Two different current magnitudes declared on the same branch
    #[error("Branch {branch} already carries a {existing} A current source, cannot add {requested} A")]
    ConflictingCurrentSources {
        branch: usize,
        existing: f64,
        requested: f64,
    },

    /// Internal resistance violating the component's ideality convention
    #[error("Invalid internal resistance {value} for '{component}': {message}")]
    InvalidInternalResistance {
        component: String,
        value: f64,
        message: String,
    },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Duplicate branch identifier
    #[error("Duplicate branch id {id}")]
    DuplicateBranch { id: usize },

    /// Branch not found in circuit
    #[error("Branch {id} not found in circuit")]
    BranchNotFound { id: usize },

    // ============ Netlist Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    // ============ Topology Errors ============
    /// Tree requested over an empty branch set
    #[error("Circuit has no branches")]
    EmptyCircuit,

    /// Not every node is reachable from the traversal start
    #[error("Circuit is disconnected: spanning tree reached {reached} of {total} nodes")]
    DisconnectedCircuit { reached: usize, total: usize },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Solve Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - circuit is unsolvable (contradictory constraints or source-only loop)")]
    SingularMatrix,

    /// Assembled equation count does not match the unknown count
    #[error("Equation system has {rows} rows for {columns} unknown branch currents")]
    DimensionMismatch { rows: usize, columns: usize },

    // ============ I/O Errors ============
    /// Error reading netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl KirchhoffError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// True for failures of the structural kind (empty, disconnected, malformed graph).
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCircuit | Self::DisconnectedCircuit { .. } | Self::InvalidTopology { .. }
        )
    }
}
