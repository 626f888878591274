//! Design hints: the per-design configuration of the flattening engine.
//!
//! Hints name the global clock, pin down module export lists, force signals
//! to be analyzed bit by bit, and toggle optional engine stages. They are read
//! from a TOML file into a strongly-typed [`DesignHints`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_hints, load_hints_from_str};
pub use types::*;
