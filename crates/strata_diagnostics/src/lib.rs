//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Analysis anomalies found while flattening a design (combinational cycles,
//! parameterized-module mismatches, unresolvable hints) are reported as
//! structured [`Diagnostic`]s located by module and signal name. The
//! thread-safe [`DiagnosticSink`] accumulates them across passes, including
//! passes running on several threads.

#![warn(missing_docs)]

pub mod code;
pub mod codes;
pub mod diagnostic;
pub mod location;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use location::Location;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
