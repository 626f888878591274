//! Recognition of parameterized library modules.
//!
//! A generated module carries its parameters in its name, as in
//! `flop$width=4`. The matcher parses such names against registered
//! [`Template`]s, regenerates the body from the parsed parameters and accepts
//! the module only when the regenerated body is structurally identical to the
//! loaded one.

#![warn(missing_docs)]

pub mod builtin;
pub mod compare;
pub mod errors;
pub mod name;
pub mod registry;
pub mod template;

pub use compare::module_diff;
pub use name::parse_name;
pub use registry::{MatchOutcome, TemplateMatch, TemplateRegistry};
pub use template::{ParamSpec, ParamValue, Params, Template};
