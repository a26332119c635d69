//! Voltage and current sources.
//!
//! Both source kinds place their positive terminal at the first node they are
//! declared with. A voltage source makes that node `voltage` volts above the
//! other; a current source drives `current` amperes out of that node into the
//! external network.

use crate::circuit::Orientation;
use crate::error::{KirchhoffError, Result};

fn check_finite(name: &str, value: f64, what: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(KirchhoffError::InvalidValue {
            component: name.to_string(),
            value,
            message: format!("{} must be finite", what),
        })
    }
}

/// An ideal voltage source placed on a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    pub name: String,
    pub voltage: f64,
    /// Orientation relative to the owning branch
    pub orientation: Orientation,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(name: impl Into<String>, voltage: f64, orientation: Orientation) -> Result<Self> {
        let name = name.into();
        check_finite(&name, voltage, "source voltage")?;
        Ok(Self {
            name,
            voltage,
            orientation,
        })
    }

    /// Voltage contribution relative to the owning branch's orientation.
    pub fn signed_voltage(&self) -> f64 {
        self.orientation.sign() * self.voltage
    }

    /// Flip the source relative to its branch.
    pub fn reversed(mut self) -> Self {
        self.orientation = self.orientation.flipped();
        self
    }
}

/// An ideal current source placed on a branch.
///
/// The branch holding it has its current fixed externally.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSource {
    pub name: String,
    pub current: f64,
    /// Orientation relative to the owning branch
    pub orientation: Orientation,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(name: impl Into<String>, current: f64, orientation: Orientation) -> Result<Self> {
        let name = name.into();
        check_finite(&name, current, "source current")?;
        Ok(Self {
            name,
            current,
            orientation,
        })
    }

    /// Rated current relative to the owning branch's orientation.
    pub fn signed_current(&self) -> f64 {
        self.orientation.sign() * self.current
    }

    /// Flip the source relative to its branch.
    pub fn reversed(mut self) -> Self {
        self.orientation = self.orientation.flipped();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_values_follow_orientation() {
        let v = VoltageSource::new("V1", 9.0, Orientation::Forward).unwrap();
        assert_eq!(v.signed_voltage(), 9.0);
        assert_eq!(v.reversed().signed_voltage(), -9.0);

        let i = CurrentSource::new("I1", 0.5, Orientation::Reversed).unwrap();
        assert_eq!(i.signed_current(), -0.5);
        assert_eq!(i.reversed().signed_current(), 0.5);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(VoltageSource::new("V1", f64::INFINITY, Orientation::Forward).is_err());
        assert!(CurrentSource::new("I1", f64::NAN, Orientation::Forward).is_err());
    }
}
