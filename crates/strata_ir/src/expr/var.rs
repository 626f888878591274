//! Expression variables.

use crate::ids::{InstanceId, WireId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a variable refers to.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum VarName {
    /// A wire of the enclosing module.
    Wire(WireId),
    /// Export `port` of sub-instance `inst`, seen from the enclosing module.
    PortInst {
        /// The sub-instance.
        inst: InstanceId,
        /// The exported wire of the instance's prototype.
        port: WireId,
    },
    /// A bit-slot of the flattened design.
    Flat(u32),
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarName::Wire(w) => write!(f, "{w}"),
            VarName::PortInst { inst, port } => write!(f, "{inst}.{port}"),
            VarName::Flat(n) => write!(f, "#{n}"),
        }
    }
}

/// A variable reference: a name read `delay` clock cycles in the past.
///
/// A delay of zero reads the current value. Positive delays read registered
/// state and stop combinational dependency analysis. The `nonblocking` flag
/// distinguishes reads of a nonblocking-assigned value and takes part in
/// equality like the other fields.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Variable {
    /// The referenced signal.
    pub name: VarName,
    /// Cycles in the past.
    #[serde(default)]
    pub delay: u32,
    /// Read of a nonblocking-assigned value.
    #[serde(default)]
    pub nonblocking: bool,
}

impl Variable {
    /// A current-cycle reference.
    pub fn new(name: VarName) -> Self {
        Self {
            name,
            delay: 0,
            nonblocking: false,
        }
    }

    /// A reference `delay` cycles in the past.
    pub fn delayed(name: VarName, delay: u32) -> Self {
        Self {
            name,
            delay,
            nonblocking: false,
        }
    }

    /// The same reference with another name.
    pub fn with_name(self, name: VarName) -> Self {
        Self { name, ..self }
    }

    /// Shorthand for a current-cycle wire reference.
    pub fn wire(wire: WireId) -> Self {
        Self::new(VarName::Wire(wire))
    }

    /// Shorthand for a current-cycle flat reference.
    pub fn flat(slot: u32) -> Self {
        Self::new(VarName::Flat(slot))
    }

    /// Returns the same name one cycle closer to the present, if delayed.
    pub fn step_back(self) -> Option<Variable> {
        (self.delay > 0).then(|| Variable {
            delay: self.delay - 1,
            ..self
        })
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.delay > 0 {
            write!(f, "@{}", self.delay)?;
        }
        if self.nonblocking {
            f.write_str("!")?;
        }
        Ok(())
    }
}
