//! Diagnostics emitted by the matcher.

use strata_diagnostics::{codes, Diagnostic, Location};

/// Creates a warning for a module whose name matches a template but whose
/// body differs from the regenerated one.
pub fn warn_template_mismatch(module: &str, template: &str, reason: &str) -> Diagnostic {
    Diagnostic::warning(
        codes::W301,
        format!("module `{module}` does not match template `{template}`"),
        Location::module(module),
    )
    .with_note(reason.to_string())
    .with_help("the module is analyzed as an ordinary module")
}
