//! The JSON report of an engine run.

use crate::run::CompiledDesign;
use serde::Serialize;
use std::collections::BTreeMap;
use strata_common::{Interner, Mask};
use strata_deps::{ModuleContext, Phased, SignalDeps};
use strata_ir::VarName;
use strata_param::TemplateMatch;

/// Dependencies of one signal in one phase, with wire names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepReport {
    /// Whether registered state is read.
    pub state: bool,
    /// Input bits read, by wire name.
    pub inputs: BTreeMap<String, Mask>,
}

/// Dependencies of one signal in both phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalReport {
    /// The signal, `y[3]` for an export bit or the first driven wire for a
    /// driver.
    pub signal: String,
    /// Analyzed per bit.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub split: bool,
    /// With the clock low.
    pub low: DepReport,
    /// With the clock high.
    pub high: DepReport,
}

/// The report of one module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    /// Module name.
    pub name: String,
    /// Some export depends on state in some phase.
    pub has_phase_state: bool,
    /// Some export depends on state with the clock low.
    pub has_cycle_state: bool,
    /// The template the module was recognized as.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateMatch>,
    /// Every export output bit.
    pub outputs: Vec<SignalReport>,
    /// Every driver.
    pub drivers: Vec<SignalReport>,
}

/// The report of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct DesignReport {
    /// Top module name.
    pub top: String,
    /// Number of flat slots below the top module.
    pub slots: usize,
    /// Number of driven nets.
    pub nets: usize,
    /// Every module, leaves first.
    pub modules: Vec<ModuleReport>,
}

impl DesignReport {
    /// Collects the report of `design`.
    pub fn new(design: &CompiledDesign, names: &Interner) -> Self {
        let model = &design.model;
        let modules = model
            .order
            .iter()
            .map(|&id| {
                let ctx = ModuleContext::new(model, id, names, &[]);
                let deps = &design.reports[id];
                let phased = |p: &Phased<SignalDeps>| {
                    let named = |d: &SignalDeps| DepReport {
                        state: d.state,
                        inputs: d
                            .inputs
                            .iter()
                            .map(|(&w, mask)| (ctx.var_name(VarName::Wire(w)), mask.clone()))
                            .collect(),
                    };
                    (named(&p.low), named(&p.high))
                };
                let outputs = deps
                    .outputs
                    .iter()
                    .map(|(&(wire, bit), p)| {
                        let (low, high) = phased(p);
                        SignalReport {
                            signal: ctx.module.wire_bit_display(names, wire, bit),
                            split: false,
                            low,
                            high,
                        }
                    })
                    .collect();
                let drivers = deps
                    .drivers
                    .iter()
                    .map(|(&driver, p)| {
                        let (low, high) = phased(p);
                        SignalReport {
                            signal: ctx.driver_name(driver),
                            split: deps.split_drivers.contains(&driver),
                            low,
                            high,
                        }
                    })
                    .collect();
                ModuleReport {
                    name: ctx.module_name().to_string(),
                    has_phase_state: deps.has_phase_state,
                    has_cycle_state: deps.has_cycle_state,
                    template: design.matched.get(&id).cloned(),
                    outputs,
                    drivers,
                }
            })
            .collect();
        DesignReport {
            top: names.resolve(model.top_module().name).to_string(),
            slots: design.compiled.hierarchy.len(),
            nets: design.compiled.res_assigns.len(),
            modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::run;
    use strata_config::DesignHints;
    use strata_diagnostics::DiagnosticSink;
    use strata_ir::{Design, Func, Lhs, Module, Variable, STRENGTH_DEFAULT};

    #[test]
    fn names_signals_and_inputs() {
        let names = Interner::new();
        let mut design = Design::new();
        let mut m = Module::new(names.get_or_intern("top"));
        let a = m.add_wire(names.get_or_intern("a"), 2);
        let y = m.add_wire(names.get_or_intern("y"), 2);
        let ea = m.exprs.var(Variable::wire(a));
        let rhs = m.exprs.call(Func::BitNot, vec![ea]);
        m.add_assign(Lhs::var(VarName::Wire(y), 2), rhs, STRENGTH_DEFAULT);
        design.top = design.add_module(m);

        let out = run(&design, &names, &DesignHints::default(), &DiagnosticSink::new()).unwrap();
        let report = DesignReport::new(&out, &names);
        assert_eq!(report.top, "top");
        let top = &report.modules[0];
        assert_eq!(top.outputs.len(), 2);
        assert_eq!(top.outputs[1].signal, "y[1]");
        assert_eq!(top.outputs[1].high.inputs["a"], Mask::bit(1));
        assert_eq!(top.drivers[0].signal, "y");
        assert!(!top.drivers[0].split);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["modules"][0]["name"], "top");
        assert!(json["modules"][0].get("template").is_none());
    }
}
