//! Linear passive components: Resistor.

use crate::error::{KirchhoffError, Result};

/// A resistor component.
///
/// An ideally open resistor carries the sentinel resistance `f64::INFINITY`
/// (see [`Resistor::open`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub name: String,
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    ///
    /// Negative and NaN resistances are rejected, infinity is the open sentinel.
    pub fn new(name: impl Into<String>, resistance: f64) -> Result<Self> {
        let name = name.into();
        if resistance.is_nan() {
            return Err(KirchhoffError::InvalidValue {
                component: name,
                value: resistance,
                message: "resistance is not a number".to_string(),
            });
        }
        if resistance < 0.0 {
            return Err(KirchhoffError::NegativeResistance {
                component: name,
                value: resistance,
            });
        }
        Ok(Self { name, resistance })
    }

    /// Create an ideally open resistor.
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resistance: f64::INFINITY,
        }
    }

    /// Check if this resistor is the open sentinel.
    pub fn is_open(&self) -> bool {
        self.resistance.is_infinite()
    }

    /// Get the conductance (1/R). Zero for an open resistor.
    pub fn conductance(&self) -> f64 {
        if self.is_open() {
            0.0
        } else {
            1.0 / self.resistance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistor_conductance() {
        let r = Resistor::new("R1", 1000.0).unwrap();
        assert!((r.conductance() - 0.001).abs() < 1e-10);
        assert_eq!(Resistor::open("R2").conductance(), 0.0);
    }

    #[test]
    fn test_negative_resistance_rejected() {
        let err = Resistor::new("R1", -5.0).unwrap_err();
        assert!(matches!(err, KirchhoffError::NegativeResistance { value, .. } if value == -5.0));
    }

    #[test]
    fn test_nan_resistance_rejected() {
        assert!(matches!(
            Resistor::new("R1", f64::NAN),
            Err(KirchhoffError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_and_open_allowed() {
        assert_eq!(Resistor::new("R1", 0.0).unwrap().resistance, 0.0);
        assert!(Resistor::new("R2", f64::INFINITY).unwrap().is_open());
    }
}
