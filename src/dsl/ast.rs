//! Syntax tree for the netlist format.

use std::collections::HashMap;

/// A parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct CircuitAst {
    /// Device lines, in file order
    pub components: Vec<ComponentDef>,
    /// `.wire` directives, in file order
    pub wires: Vec<WireDef>,
    /// Set by `.reduce`
    pub reduce: bool,
    /// Node named by `.ground`
    pub ground: Option<String>,
    /// Every referenced node name, in order of first appearance
    pub nodes: Vec<String>,
}

impl CircuitAst {
    /// Create a new empty AST.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node name the first time it is seen.
    pub(crate) fn note_node(&mut self, name: &str) {
        if !self.nodes.iter().any(|n| n == name) {
            self.nodes.push(name.to_string());
        }
    }
}

/// One device line.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub component_type: ComponentType,
    /// Device name as written, including its type prefix
    pub name: String,
    /// Terminal node names; ground aliases are normalized to `"0"`
    pub nodes: Vec<String>,
    /// Positional value (resistance, voltage, current)
    pub value: Option<f64>,
    /// `key=value` parameters, keys lowercased
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// A `.wire a b` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDef {
    pub nodes: [String; 2],
    pub line: usize,
}

/// Device types of the netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// `R`
    Resistor,
    /// `V`
    VoltageSource,
    /// `I`
    CurrentSource,
    /// `VM`
    Voltmeter,
    /// `AM`
    Ammeter,
}

impl ComponentType {
    /// Determine the type from a device name's prefix.
    ///
    /// Two-letter meter prefixes win over the single-letter source prefix,
    /// so `VM1` is a voltmeter and `V1` a voltage source.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.starts_with("VM") {
            Some(Self::Voltmeter)
        } else if upper.starts_with("AM") {
            Some(Self::Ammeter)
        } else {
            match upper.chars().next()? {
                'R' => Some(Self::Resistor),
                'V' => Some(Self::VoltageSource),
                'I' => Some(Self::CurrentSource),
                _ => None,
            }
        }
    }

    /// Check if a positional value is mandatory.
    pub fn requires_value(&self) -> bool {
        matches!(self, Self::Resistor | Self::VoltageSource | Self::CurrentSource)
    }

    /// Parameter keys accepted after the positional arguments.
    pub fn accepts_param(&self, key: &str) -> bool {
        match self {
            Self::Resistor => false,
            _ => key == "r",
        }
    }
}

/// Check if `name` refers to ground.
pub fn is_ground_name(name: &str) -> bool {
    name == "0" || name.eq_ignore_ascii_case("gnd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_from_name() {
        assert_eq!(ComponentType::from_name("R12"), Some(ComponentType::Resistor));
        assert_eq!(ComponentType::from_name("v_in"), Some(ComponentType::VoltageSource));
        assert_eq!(ComponentType::from_name("VM1"), Some(ComponentType::Voltmeter));
        assert_eq!(ComponentType::from_name("am_load"), Some(ComponentType::Ammeter));
        assert_eq!(ComponentType::from_name("I2"), Some(ComponentType::CurrentSource));
        assert_eq!(ComponentType::from_name("C1"), None);
        assert_eq!(ComponentType::from_name(""), None);
    }

    #[test]
    fn test_ground_aliases() {
        assert!(is_ground_name("0"));
        assert!(is_ground_name("GND"));
        assert!(is_ground_name("gnd"));
        assert!(!is_ground_name("00"));
    }
}
