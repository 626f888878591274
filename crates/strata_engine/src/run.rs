//! The engine pipeline.

use crate::error::EngineError;
use crate::hints::check_hint_modules;
use std::collections::BTreeMap;
use strata_common::Interner;
use strata_config::DesignHints;
use strata_deps::{analyze_design, ModuleDeps};
use strata_diagnostics::DiagnosticSink;
use strata_flatten::{compile, make_aliases_bottom_up, verify_aliases, verify_compiled, CompiledNets, Layout};
use strata_ir::{Arena, Design, ModuleId};
use strata_model::Model;
use strata_param::{TemplateMatch, TemplateRegistry};
use tracing::{debug, info};

/// Everything the engine derives from a design.
#[derive(Debug)]
pub struct CompiledDesign {
    /// The hierarchical model.
    pub model: Model,
    /// The flattened and compiled nets below the top module.
    pub compiled: CompiledNets,
    /// Dependency analysis of every module.
    pub reports: Arena<ModuleId, ModuleDeps>,
    /// Modules recognized as template instances.
    pub matched: BTreeMap<ModuleId, TemplateMatch>,
}

/// Builds the model only, reporting structural errors.
pub fn check(
    design: &Design,
    names: &Interner,
    hints: &DesignHints,
    sink: &DiagnosticSink,
) -> Result<Model, EngineError> {
    check_hint_modules(design, names, hints, sink);
    let model = Model::build(design, names, hints)?;
    info!(modules = model.modules.len(), "model built");
    Ok(model)
}

/// Runs every pass over `design`.
///
/// Structural errors abort with `Err`. Cycles, template mismatches and
/// unknown hint names are reported to `sink` and do not stop the run.
pub fn run(
    design: &Design,
    names: &Interner,
    hints: &DesignHints,
    sink: &DiagnosticSink,
) -> Result<CompiledDesign, EngineError> {
    let matched = if hints.engine.templates {
        TemplateRegistry::with_builtins().match_design(design, names, sink)
    } else {
        BTreeMap::new()
    };
    debug!(matched = matched.len(), "template matching done");

    let model = check(design, names, hints, sink)?;

    let compiled = compile(&model)?;
    info!(
        slots = compiled.hierarchy.len(),
        nets = compiled.res_assigns.len(),
        "design flattened"
    );

    if hints.engine.verify {
        let layout = Layout::new(&model);
        let bottom_up = make_aliases_bottom_up(&model, &layout)?;
        verify_aliases(&compiled.aliases, &bottom_up)?;
        verify_compiled(&compiled)?;
        info!("self-consistency checks passed");
    }

    let reports = analyze_design(&model, names, hints, sink, hints.engine.parallel);
    info!(modules = reports.len(), "dependency analysis done");

    Ok(CompiledDesign {
        model,
        compiled,
        reports,
        matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_diagnostics::codes;
    use strata_ir::{Func, Lhs, Module, VarName, Variable, WireId, STRENGTH_DEFAULT};
    use strata_model::ModelError;

    fn inverter_design(names: &Interner) -> Design {
        let mut design = Design::new();
        let mut m = Module::new(names.get_or_intern("top"));
        let a = m.add_wire(names.get_or_intern("a"), 1);
        let y = m.add_wire(names.get_or_intern("y"), 1);
        let ea = m.exprs.var(Variable::wire(a));
        let rhs = m.exprs.call(Func::BitNot, vec![ea]);
        m.add_assign(Lhs::var(VarName::Wire(y), 1), rhs, STRENGTH_DEFAULT);
        design.top = design.add_module(m);
        design
    }

    #[test]
    fn runs_with_verification() {
        let names = Interner::new();
        let design = inverter_design(&names);
        let mut hints = DesignHints::default();
        hints.engine.verify = true;
        let sink = DiagnosticSink::new();
        let out = run(&design, &names, &hints, &sink).unwrap();
        assert!(sink.diagnostics().is_empty());
        assert_eq!(out.compiled.res_assigns.len(), 1);
        let top = &out.reports[out.model.top];
        let y = &top.outputs[&(WireId::from_raw(1), 0)];
        assert!(y.low.inputs.contains_key(&WireId::from_raw(0)));
        assert!(out.matched.is_empty());
    }

    #[test]
    fn structural_errors_abort() {
        let names = Interner::new();
        let mut design = inverter_design(&names);
        let top = design.top;
        let m = &mut design.modules[top];
        let zero = m.exprs.constant(strata_common::Value::zero());
        m.add_assign(Lhs::var(VarName::Wire(WireId::from_raw(1)), 1), zero, STRENGTH_DEFAULT);
        let err = run(&design, &names, &DesignHints::default(), &DiagnosticSink::new()).unwrap_err();
        assert!(matches!(err, EngineError::Model(ModelError::Consistency { .. })));
    }

    #[test]
    fn unknown_hint_module_is_only_a_warning() {
        let names = Interner::new();
        let design = inverter_design(&names);
        let mut hints = DesignHints::default();
        hints.exports.insert("nowhere".into(), vec!["a".into()]);
        let sink = DiagnosticSink::new();
        assert!(run(&design, &names, &hints, &sink).is_ok());
        assert_eq!(sink.diagnostics()[0].code, codes::W302);
    }
}
