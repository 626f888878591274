//! `strata check`.

use crate::analyze::hints_from;
use crate::output::{fatal, render_diagnostics};
use crate::{CheckArgs, GlobalArgs};
use strata_diagnostics::DiagnosticSink;
use strata_engine::load_design;

/// Builds the model and reports structural errors. Returns the exit code.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let hints = hints_from(args.hints.as_deref())?;
    let sink = DiagnosticSink::new();
    let (names, design) = match load_design(&args.design) {
        Ok(loaded) => loaded,
        Err(e) => return fatal(e, &sink, global),
    };
    let model = match strata_engine::check(&design, &names, &hints, &sink) {
        Ok(model) => model,
        Err(e) => return fatal(e, &sink, global),
    };
    if !global.quiet {
        eprintln!("   Checked {} module(s)", model.modules.len());
    }
    let errors = render_diagnostics(&sink, global);
    Ok(if errors > 0 { 1 } else { 0 })
}
