//! Two-phase combinational dependency analysis.
//!
//! Each module is analyzed twice, once with the global clock forced low and
//! once with it forced high. Whole-signal ("crude") graphs locate signals on
//! apparent cycles; those are re-analyzed per bit ("split") so that false
//! cycles from merged bit masks disappear. Closures over the resulting graph
//! give, for every export output bit and every driver, the module inputs and
//! registered state it depends on.

#![warn(missing_docs)]

pub mod analyze;
pub mod closure;
pub mod errors;
pub mod graph;
pub mod node;
pub mod patch;
pub mod report;

pub use analyze::{analyze_design, analyze_module, ModuleContext};
pub use closure::Closure;
pub use graph::{DepGraph, SplitSet};
pub use node::{Leaf, Node, Phase};
pub use report::{ModuleDeps, Phased, SignalDeps};
