//! Shared foundational types used across the Strata design-flattening engine.
//!
//! This crate provides interned identifiers, single-bit 4-state logic values,
//! arbitrary-width 4-state [`Value`]s, bit care [`Mask`]s, and the internal
//! error type used for self-consistency failures.

#![warn(missing_docs)]

pub mod ident;
pub mod logic;
pub mod mask;
pub mod result;
pub mod value;

pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use mask::Mask;
pub use result::{InternalError, StrataResult};
pub use value::Value;
