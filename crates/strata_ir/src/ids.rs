//! Opaque ID newtypes for design entities.
//!
//! Wire, instance and assignment IDs are local to their module; module IDs
//! are local to their design; expression IDs are local to one
//! [`ExprManager`](crate::ExprManager).

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the raw index as a `usize`.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A module in a design.
    ModuleId, "m"
);

define_id!(
    /// A wire within a module.
    WireId, "w"
);

define_id!(
    /// A sub-module instance within a module.
    InstanceId, "i"
);

define_id!(
    /// A raw assignment within a module, and the driver built from it.
    AssignId, "d"
);

define_id!(
    /// A node in an expression manager.
    ExprId, "e"
);
