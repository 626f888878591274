//! The hierarchical model: checked, extended modules built leaves-first.
//!
//! Building the model validates every raw module (widths, strengths,
//! references, double assignment), classifies exports as input or output
//! bits, and resolves each alias into a sink and a source. The result records,
//! for every driven bit of every wire and port-instance, what drives it.

#![warn(missing_docs)]

pub mod build;
pub mod error;
pub mod exports;
pub mod resolve;
pub mod types;

pub use build::Model;
pub use error::ModelError;
pub use exports::compute_exports;
pub use types::*;
