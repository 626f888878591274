//! Logging setup and diagnostic rendering shared by the commands.

use crate::GlobalArgs;
use strata_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use strata_engine::EngineError;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the `-v`/`-q` flags.
pub fn init_logging(global: &GlobalArgs) {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Renders every diagnostic to stderr, followed by a summary line.
///
/// Returns the number of errors.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) -> usize {
    let diagnostics = sink.diagnostics();
    let renderer = TerminalRenderer::new(global.color);
    let mut errors = 0;
    let mut warnings = 0;
    for diag in &diagnostics {
        match diag.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
            Severity::Note => {}
        }
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        eprint!("{}", renderer.render(diag));
    }
    if !global.quiet && !diagnostics.is_empty() {
        eprintln!("   Result: {errors} error(s), {warnings} warning(s)");
    }
    errors
}

/// Reports a fatal engine error. Design problems are rendered as
/// diagnostics and give exit code 1; anything else is returned.
pub fn fatal(
    e: EngineError,
    sink: &DiagnosticSink,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    match e.to_diagnostic() {
        Some(diag) => {
            sink.emit(diag);
            render_diagnostics(sink, global);
            Ok(1)
        }
        None => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_diagnostics::{codes, Diagnostic, Location};

    #[test]
    fn counts_errors() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::warning(codes::W300, "cycle", Location::module("top")));
        sink.emit(Diagnostic::error(codes::E301, "overlap", Location::module("top")));
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
        };
        assert_eq!(render_diagnostics(&sink, &global), 1);
    }
}
