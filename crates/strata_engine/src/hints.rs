//! Checks of hint names against the design.

use std::collections::BTreeSet;
use strata_common::Interner;
use strata_config::DesignHints;
use strata_diagnostics::{codes, Diagnostic, DiagnosticSink, Location};
use strata_ir::Design;

/// Warns about hint sections naming modules the design does not have.
///
/// Wire, driver and port-instance names inside a section are checked by the
/// passes that use them.
pub fn check_hint_modules(design: &Design, names: &Interner, hints: &DesignHints, sink: &DiagnosticSink) {
    let known: BTreeSet<&str> = design
        .modules
        .values()
        .map(|m| names.resolve(m.name))
        .collect();
    let sections = [
        ("exports", hints.exports.keys()),
        ("split.port_insts", hints.split.port_insts.keys()),
        ("split.drivers", hints.split.drivers.keys()),
    ];
    for (section, modules) in sections {
        for module in modules {
            if !known.contains(module.as_str()) {
                sink.emit(
                    Diagnostic::warning(
                        codes::W302,
                        format!("hint section `{section}` names unknown module `{module}`"),
                        Location::module(module.as_str()),
                    )
                    .with_help("the entry is ignored"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_ir::Module;

    #[test]
    fn unknown_modules_warn() {
        let names = Interner::new();
        let mut design = Design::new();
        design.top = design.add_module(Module::new(names.get_or_intern("top")));
        let mut hints = DesignHints::default();
        hints.exports.insert("top".into(), vec![]);
        hints.split.drivers.insert("ghost".into(), vec!["y".into()]);

        let sink = DiagnosticSink::new();
        check_hint_modules(&design, &names, &hints, &sink);
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::W302);
        assert_eq!(
            diags[0].message,
            "hint section `split.drivers` names unknown module `ghost`"
        );
    }
}
