//! Diagnostics emitted by dependency analysis.

use crate::node::Phase;
use strata_diagnostics::{codes, Diagnostic, Location};

/// Creates a warning for a combinational cycle through `members`.
pub fn warn_comb_cycle(module: &str, members: &[String], phase: Phase) -> Diagnostic {
    let first = members.first().map_or("", String::as_str);
    Diagnostic::warning(
        codes::W300,
        format!("combinational cycle through {}", members.join(", ")),
        Location::signal(module, first),
    )
    .with_note(format!("found with the clock {phase}"))
    .with_help("dependencies of signals on the cycle are approximated")
}

/// Creates a warning for a split hint naming something that does not exist.
pub fn warn_unknown_split(module: &str, kind: &str, name: &str) -> Diagnostic {
    Diagnostic::warning(
        codes::W302,
        format!("split hint names unknown {kind} `{name}`"),
        Location::module(module),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_diagnostics::Severity;

    #[test]
    fn cycle_warning() {
        let d = warn_comb_cycle("top", &["a".into(), "b".into()], Phase::Low);
        assert_eq!(d.code, codes::W300);
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.message, "combinational cycle through a, b");
        assert_eq!(d.location, Location::signal("top", "a"));
        assert_eq!(d.notes, ["found with the clock low"]);
    }

    #[test]
    fn unknown_split_warning() {
        let d = warn_unknown_split("top", "port-instance", "u9.y");
        assert_eq!(d.code, codes::W302);
        assert!(d.message.contains("`u9.y`"));
    }
}
