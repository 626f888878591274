//! Raw modules as produced by a front end.
//!
//! A raw [`Module`] is unchecked: widths, strengths and references are only
//! validated when the hierarchical model is built from it.

use crate::arena::Arena;
use crate::expr::ExprManager;
use crate::ids::{AssignId, ExprId, InstanceId, ModuleId, WireId};
use crate::lhs::Lhs;
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// Raw strength of an ordinary continuous assignment.
pub const STRENGTH_DEFAULT: u8 = 6;

/// Raw strength of an assignment with an explicit drive strength.
pub const STRENGTH_NORMAL: u8 = 10;

/// A named multi-bit wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    /// The wire name.
    pub name: Ident,
    /// Number of bits.
    pub width: u32,
    /// Declared index of bit 0, kept for display.
    #[serde(default)]
    pub low_idx: i64,
}

/// A sub-module instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// The instance name.
    pub name: Ident,
    /// The prototype module.
    pub module: ModuleId,
}

/// A continuous assignment of an expression to an Lhs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assign {
    /// The driven bits.
    pub lhs: Lhs,
    /// The driving expression, in the module's expression manager.
    pub rhs: ExprId,
    /// Raw drive strength.
    pub strength: u8,
}

/// A bidirectional connection between two equal-width Lhs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// One side.
    pub lhs: Lhs,
    /// The other side.
    pub rhs: Lhs,
}

/// A raw module definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: Ident,
    /// Wires, in declaration order. Exports are always a prefix.
    pub wires: Arena<WireId, Wire>,
    /// Sub-module instances.
    pub instances: Arena<InstanceId, Instance>,
    /// Continuous assignments.
    pub assigns: Arena<AssignId, Assign>,
    /// Aliases.
    #[serde(default)]
    pub aliases: Vec<Alias>,
    /// Storage for every expression of the module.
    pub exprs: ExprManager,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            wires: Arena::new(),
            instances: Arena::new(),
            assigns: Arena::new(),
            aliases: Vec::new(),
            exprs: ExprManager::new(),
        }
    }

    /// Declares a wire.
    pub fn add_wire(&mut self, name: Ident, width: u32) -> WireId {
        self.wires.alloc(Wire {
            name,
            width,
            low_idx: 0,
        })
    }

    /// Declares an instance of `module`.
    pub fn add_instance(&mut self, name: Ident, module: ModuleId) -> InstanceId {
        self.instances.alloc(Instance { name, module })
    }

    /// Adds a continuous assignment.
    pub fn add_assign(&mut self, lhs: Lhs, rhs: ExprId, strength: u8) -> AssignId {
        self.assigns.alloc(Assign { lhs, rhs, strength })
    }

    /// Adds an alias.
    pub fn add_alias(&mut self, lhs: Lhs, rhs: Lhs) {
        self.aliases.push(Alias { lhs, rhs });
    }

    /// Finds a wire by name.
    pub fn find_wire(&self, name: Ident) -> Option<WireId> {
        self.wires.iter().find(|(_, w)| w.name == name).map(|(id, _)| id)
    }

    /// Finds an instance by name.
    pub fn find_instance(&self, name: Ident) -> Option<InstanceId> {
        self.instances
            .iter()
            .find(|(_, i)| i.name == name)
            .map(|(id, _)| id)
    }
}
