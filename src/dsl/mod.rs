//! Netlist format for circuit descriptions.
//!
//! A SPICE-like, line-oriented text format. One device or directive per
//! line; `#` and `;` start comments.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist   = { line }
//! line      = [ device | directive ] [ comment ] newline
//! device    = name node node [ value ] { param }
//! directive = ".wire" node node | ".reduce" | ".ground" node
//! param     = "r" "=" value
//! node      = identifier | integer
//! value     = number [ suffix ] | "inf"
//! suffix    = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! ```
//!
//! # Devices
//!
//! | Prefix | Device | Syntax | Default `r` |
//! |--------|--------|--------|-------------|
//! | R | Resistor | `R<name> <a> <b> <ohms>` | |
//! | V | Voltage source, + at `a` | `V<name> <a> <b> <volts> [r=..]` | 0 |
//! | I | Current source, out of `a` | `I<name> <a> <b> <amps> [r=..]` | inf |
//! | VM | Voltmeter, reads V(a) - V(b) | `VM<name> <a> <b> [r=..]` | inf |
//! | AM | Ammeter, reads current a -> b | `AM<name> <a> <b> [r=..]` | 0 |
//!
//! `0` and `GND` name the ground node. Integer node names keep their value
//! as node id.
//!
//! # Example
//!
//! ```text
//! # Loaded divider
//! V1   in   0    12
//! R1   in   mid  1k
//! R2   mid  0    2k
//! VM1  mid  0
//! ```

mod ast;
mod lexer;
mod netlist;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use netlist::Netlist;
pub use parser::Parser;

use crate::error::Result;

/// Parse netlist text into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse netlist text and build the circuit it describes.
pub fn load(input: &str) -> Result<Netlist> {
    Netlist::from_ast(&parse(input)?)
}

/// Parse and build a netlist file.
#[cfg(feature = "cli")]
pub fn load_file(path: &std::path::Path) -> Result<Netlist> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::KirchhoffError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load(&content)
}
