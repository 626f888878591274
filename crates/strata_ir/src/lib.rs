//! The raw design representation consumed by the flattening engine.
//!
//! This crate defines the expression core ([`ExprManager`], [`Func`],
//! [`Variable`]), bit-range targets ([`Lhs`]), raw [`Module`]s and
//! [`Design`]s, and the [`DesignFile`] interchange wrapper.

#![warn(missing_docs)]

pub mod arena;
pub mod design;
pub mod expr;
pub mod file;
pub mod ids;
pub mod lhs;
pub mod module;

pub use arena::{Arena, ArenaId};
pub use design::{Design, DesignError};
pub use expr::{ExprManager, ExprNode, Func, Simplified, VarName, Variable};
pub use file::DesignFile;
pub use ids::{AssignId, ExprId, InstanceId, ModuleId, WireId};
pub use lhs::{LhAtom, LhBit, Lhrange, Lhs};
pub use module::{Alias, Assign, Instance, Module, Wire, STRENGTH_DEFAULT, STRENGTH_NORMAL};
