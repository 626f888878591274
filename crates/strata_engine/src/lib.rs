//! The flattening engine: model construction, flattening, driver compilation
//! and dependency analysis of a whole design, in that order.

#![warn(missing_docs)]

pub mod error;
pub mod hints;
pub mod load;
pub mod report;
pub mod run;

pub use error::EngineError;
pub use load::{load_design, load_design_from_str};
pub use report::DesignReport;
pub use run::{check, run, CompiledDesign};
