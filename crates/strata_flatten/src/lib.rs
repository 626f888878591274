//! Flattening and net-level driver compilation.
//!
//! Every wire of every module instance gets a flat slot. The alias table maps
//! each slot to the canonical bits it stands for, and the driver compiler
//! rewrites every driver of every instance into flat terms, groups the
//! contributions per net and resolves them into one expression per net.

#![warn(missing_docs)]

pub mod alias;
pub mod compile;
pub mod layout;

pub use alias::{make_aliases, make_aliases_bottom_up, verify_aliases, AliasTable};
pub use compile::{
    compile, delay_links, net_assigns, resolve_nets, verify_compiled, CompiledNets, NetDriver,
    NormAssign,
};
pub use layout::{FlatSlot, Hierarchy, Layout, Scope};
