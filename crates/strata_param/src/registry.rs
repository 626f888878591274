//! The template registry and design-wide matching.

use crate::builtin::builtins;
use crate::compare::module_diff;
use crate::errors::warn_template_mismatch;
use crate::name::parse_name;
use crate::template::{Params, Template};
use serde::Serialize;
use std::collections::BTreeMap;
use strata_common::Interner;
use strata_diagnostics::DiagnosticSink;
use strata_ir::{Design, Module, ModuleId};
use tracing::debug;

/// A module recognized as an instance of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateMatch {
    /// Base name of the template.
    pub template: String,
    /// The parsed parameters.
    pub params: Params,
}

/// The outcome of matching one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No template parses the name.
    NoMatch,
    /// The regenerated body is identical.
    Matched(TemplateMatch),
    /// The name parses but the body differs.
    Mismatch {
        /// Base name of the template.
        template: String,
        /// First difference found.
        reason: String,
    },
}

/// An ordered set of templates; the first whose grammar accepts a name wins.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<Box<dyn Template>>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in templates.
    pub fn with_builtins() -> Self {
        Self {
            templates: builtins(),
        }
    }

    /// Adds a template after the existing ones.
    pub fn register(&mut self, template: Box<dyn Template>) {
        self.templates.push(template);
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no template is registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The first template accepting `name`, with the parsed parameters.
    pub fn find(&self, name: &str) -> Option<(&dyn Template, Params)> {
        self.templates.iter().find_map(|t| {
            parse_name(name, t.base(), t.params()).map(|p| (t.as_ref(), p))
        })
    }

    /// Matches one module.
    pub fn match_module(&self, module: &Module, names: &Interner) -> MatchOutcome {
        let name = names.resolve(module.name);
        let Some((template, params)) = self.find(name) else {
            return MatchOutcome::NoMatch;
        };
        let template_name = template.base().to_string();
        let Some(generated) = template.generate(name, &params, names) else {
            return MatchOutcome::Mismatch {
                template: template_name,
                reason: format!("cannot generate with {params}"),
            };
        };
        match module_diff(module, &generated) {
            None => MatchOutcome::Matched(TemplateMatch {
                template: template_name,
                params,
            }),
            Some(reason) => MatchOutcome::Mismatch {
                template: template_name,
                reason,
            },
        }
    }

    /// Matches every module of `design`, warning about mismatches.
    pub fn match_design(
        &self,
        design: &Design,
        names: &Interner,
        sink: &DiagnosticSink,
    ) -> BTreeMap<ModuleId, TemplateMatch> {
        let mut matched = BTreeMap::new();
        for (id, module) in design.modules.iter() {
            match self.match_module(module, names) {
                MatchOutcome::NoMatch => {}
                MatchOutcome::Matched(m) => {
                    debug!(module = names.resolve(module.name), template = %m.template, "template matched");
                    matched.insert(id, m);
                }
                MatchOutcome::Mismatch { template, reason } => {
                    sink.emit(warn_template_mismatch(
                        names.resolve(module.name),
                        &template,
                        &reason,
                    ));
                }
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::Gate;
    use crate::template::ParamValue;
    use strata_diagnostics::codes;

    #[test]
    fn regenerated_module_matches() {
        let names = Interner::new();
        let reg = TemplateRegistry::with_builtins();
        let (t, p) = reg.find("gate$op=or$width=2").unwrap();
        let module = t.generate("gate$op=or$width=2", &p, &names).unwrap();
        let outcome = reg.match_module(&module, &names);
        let MatchOutcome::Matched(m) = outcome else {
            panic!("expected a match, got {outcome:?}");
        };
        assert_eq!(m.template, "gate");
        assert_eq!(m.params.0["op"], ParamValue::Str("or".into()));
    }

    #[test]
    fn edited_module_is_a_mismatch() {
        let names = Interner::new();
        let reg = TemplateRegistry::with_builtins();
        let (t, p) = reg.find("latch$width=2").unwrap();
        let mut module = t.generate("latch$width=2", &p, &names).unwrap();
        module.add_wire(names.get_or_intern("extra"), 1);

        let mut design = Design::new();
        design.top = design.add_module(module);
        let sink = DiagnosticSink::new();
        let matched = reg.match_design(&design, &names, &sink);
        assert!(matched.is_empty());
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::W301);
        assert_eq!(diags[0].notes, ["4 wires, expected 3"]);
    }

    #[test]
    fn ungeneratable_params_are_a_mismatch() {
        let names = Interner::new();
        let module = Module::new(names.get_or_intern("gate$op=nand"));
        let outcome = TemplateRegistry::with_builtins().match_module(&module, &names);
        assert!(matches!(outcome, MatchOutcome::Mismatch { ref template, .. } if template == "gate"));
    }

    #[test]
    fn ordinary_names_do_not_match() {
        let names = Interner::new();
        let module = Module::new(names.get_or_intern("alu"));
        let mut reg = TemplateRegistry::new();
        assert!(reg.is_empty());
        reg.register(Box::new(Gate::default()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.match_module(&module, &names), MatchOutcome::NoMatch);
    }
}
