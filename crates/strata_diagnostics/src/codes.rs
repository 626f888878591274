//! The diagnostic codes emitted by the flattening engine.
//!
//! `E300`--`E303` render structural failures of a design; `W300`--`W302` are
//! analysis anomalies that do not stop the run.

use crate::code::{Category, DiagnosticCode};

/// Inconsistent design: illegal strength, bad width, double assignment or an
/// unknown reference.
pub const E300: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 300,
};

/// Alias sink bits that are already assigned.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// Aliases that never reach a driver.
pub const E302: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 302,
};

/// Malformed module hierarchy: unknown prototype, recursion or missing top.
pub const E303: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 303,
};

/// Combinational cycle in a dependency graph.
pub const W300: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 300,
};

/// A module named like a parameterized template whose body differs from the
/// regenerated template.
pub const W301: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// A design hint names a module or signal that does not exist.
pub const W302: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 302,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_render() {
        let all = [E300, E301, E302, E303, W300, W301, W302];
        let text: Vec<String> = all.iter().map(ToString::to_string).collect();
        assert_eq!(text, ["E300", "E301", "E302", "E303", "W300", "W301", "W302"]);
    }
}
