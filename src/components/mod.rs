//! Component models for circuit construction.
//!
//! This module provides the value objects a branch is built from:
//! - Linear: Resistor
//! - Sources: Voltage Source, Current Source
//! - Instruments: Voltmeter, Ammeter
//!
//! A [`Component`] is an element stored on a branch. A [`Device`] is what a
//! user adds to a circuit; one device may expand into several components or
//! branches (a current source with finite internal resistance becomes an
//! ideal source branch plus a parallel resistor branch).

mod linear;
mod meters;
mod sources;

pub use linear::Resistor;
pub use meters::{Instrument, InstrumentKind};
pub use sources::{CurrentSource, VoltageSource};

use crate::circuit::Orientation;
use crate::dsl::{ComponentDef, ComponentType};
use crate::error::{KirchhoffError, Result};

/// An element stored on a branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
}

impl Component {
    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
        }
    }

    /// Resistance contributed to the branch (sources are ideal).
    pub fn resistance(&self) -> f64 {
        match self {
            Component::Resistor(r) => r.resistance,
            _ => 0.0,
        }
    }

    /// Source voltage contributed to the branch, relative to its orientation.
    pub fn signed_voltage(&self) -> f64 {
        match self {
            Component::VoltageSource(v) => v.signed_voltage(),
            _ => 0.0,
        }
    }

    /// Rated current relative to the branch orientation, for current sources.
    pub fn signed_current(&self) -> Option<f64> {
        match self {
            Component::CurrentSource(i) => Some(i.signed_current()),
            _ => None,
        }
    }

    /// The same component seen from the opposite branch direction.
    pub fn reversed(self) -> Self {
        match self {
            Component::Resistor(r) => Component::Resistor(r),
            Component::VoltageSource(v) => Component::VoltageSource(v.reversed()),
            Component::CurrentSource(i) => Component::CurrentSource(i.reversed()),
        }
    }

    /// Re-orient by `orientation` (no-op when forward).
    pub fn oriented(self, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Forward => self,
            Orientation::Reversed => self.reversed(),
        }
    }
}

/// A device that can be added to a circuit between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Device {
    /// Resistor of the given resistance
    Resistor { resistance: f64 },
    /// Voltage source; the internal resistance sits in series on the same branch
    VoltageSource { voltage: f64, internal_resistance: f64 },
    /// Current source; a finite internal resistance becomes a parallel branch
    CurrentSource { current: f64, internal_resistance: f64 },
    /// Voltmeter, modelled by its internal resistance
    Voltmeter { internal_resistance: f64 },
    /// Ammeter, modelled by its internal resistance
    Ammeter { internal_resistance: f64 },
}

impl Device {
    /// Prefix used when generating a name for an unnamed device.
    pub fn prefix(&self) -> &'static str {
        match self {
            Device::Resistor { .. } => "R",
            Device::VoltageSource { .. } => "V",
            Device::CurrentSource { .. } => "I",
            Device::Voltmeter { .. } => "VM",
            Device::Ammeter { .. } => "AM",
        }
    }

    /// Check the device's values against its ideality convention.
    ///
    /// - voltage source and ammeter: internal resistance finite and >= 0 (0 is ideal)
    /// - current source and voltmeter: internal resistance > 0 (infinite is ideal)
    pub fn validate(&self, name: &str) -> Result<()> {
        let internal = match *self {
            Device::Resistor { resistance } => {
                return Resistor::new(name, resistance).map(|_| ());
            }
            Device::VoltageSource { internal_resistance, .. }
            | Device::CurrentSource { internal_resistance, .. }
            | Device::Voltmeter { internal_resistance }
            | Device::Ammeter { internal_resistance } => internal_resistance,
        };

        if internal.is_nan() {
            return Err(KirchhoffError::InvalidValue {
                component: name.to_string(),
                value: internal,
                message: "internal resistance is not a number".to_string(),
            });
        }
        if internal < 0.0 {
            return Err(KirchhoffError::NegativeResistance {
                component: name.to_string(),
                value: internal,
            });
        }

        let violation = match self {
            Device::VoltageSource { .. } | Device::Ammeter { .. } if internal.is_infinite() => {
                Some("must be finite (zero is ideal)")
            }
            Device::CurrentSource { .. } | Device::Voltmeter { .. } if internal == 0.0 => {
                Some("must be positive (infinite is ideal)")
            }
            _ => None,
        };

        match violation {
            Some(message) => Err(KirchhoffError::InvalidInternalResistance {
                component: name.to_string(),
                value: internal,
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Create a device from a netlist definition.
    pub fn from_def(def: &ComponentDef) -> Result<Self> {
        let internal = def.params.get("r").copied();
        match def.component_type {
            ComponentType::Resistor => {
                let resistance = def.value.ok_or_else(|| {
                    KirchhoffError::invalid_component(&def.name, def.line, "resistor requires a value")
                })?;
                Ok(Device::Resistor { resistance })
            }

            ComponentType::VoltageSource => {
                let voltage = def.value.ok_or_else(|| {
                    KirchhoffError::invalid_component(&def.name, def.line, "voltage source requires a value")
                })?;
                Ok(Device::VoltageSource {
                    voltage,
                    internal_resistance: internal.unwrap_or(0.0),
                })
            }

            ComponentType::CurrentSource => {
                let current = def.value.ok_or_else(|| {
                    KirchhoffError::invalid_component(&def.name, def.line, "current source requires a value")
                })?;
                Ok(Device::CurrentSource {
                    current,
                    internal_resistance: internal.unwrap_or(f64::INFINITY),
                })
            }

            ComponentType::Voltmeter => Ok(Device::Voltmeter {
                internal_resistance: internal.or(def.value).unwrap_or(f64::INFINITY),
            }),

            ComponentType::Ammeter => Ok(Device::Ammeter {
                internal_resistance: internal.or(def.value).unwrap_or(0.0),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideality_conventions() {
        let ideal_v = Device::VoltageSource {
            voltage: 5.0,
            internal_resistance: 0.0,
        };
        assert!(ideal_v.validate("V1").is_ok());

        let open_v = Device::VoltageSource {
            voltage: 5.0,
            internal_resistance: f64::INFINITY,
        };
        assert!(matches!(
            open_v.validate("V1"),
            Err(KirchhoffError::InvalidInternalResistance { .. })
        ));

        let shorted_i = Device::CurrentSource {
            current: 1.0,
            internal_resistance: 0.0,
        };
        assert!(matches!(
            shorted_i.validate("I1"),
            Err(KirchhoffError::InvalidInternalResistance { .. })
        ));

        let ideal_vm = Device::Voltmeter {
            internal_resistance: f64::INFINITY,
        };
        assert!(ideal_vm.validate("VM1").is_ok());

        let negative_am = Device::Ammeter {
            internal_resistance: -1.0,
        };
        assert!(matches!(
            negative_am.validate("AM1"),
            Err(KirchhoffError::NegativeResistance { .. })
        ));
    }

    #[test]
    fn test_nan_internal_resistance_is_invalid_value() {
        let vm = Device::Voltmeter {
            internal_resistance: f64::NAN,
        };
        assert!(matches!(
            vm.validate("VM1"),
            Err(KirchhoffError::InvalidValue { .. })
        ));

        let v = Device::VoltageSource {
            voltage: 1.0,
            internal_resistance: f64::NAN,
        };
        assert!(matches!(v.validate("V1"), Err(KirchhoffError::InvalidValue { .. })));
    }

    #[test]
    fn test_component_reversal() {
        let c = Component::VoltageSource(VoltageSource::new("V1", 3.0, Orientation::Forward).unwrap());
        assert_eq!(c.clone().oriented(Orientation::Forward).signed_voltage(), 3.0);
        assert_eq!(c.oriented(Orientation::Reversed).signed_voltage(), -3.0);

        let r = Component::Resistor(Resistor::new("R1", 10.0).unwrap());
        assert_eq!(r.clone().reversed(), r);
    }
}
