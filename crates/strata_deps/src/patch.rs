//! Clock patching.

use crate::node::Phase;
use std::collections::BTreeSet;
use strata_common::Value;
use strata_ir::{Arena, AssignId, ExprId, ExprManager, VarName};
use strata_model::ModuleExt;

/// Driver expressions of one module with the global clock replaced by the
/// phase's constant and constants folded.
#[derive(Debug, Clone)]
pub struct Patched {
    /// Storage for the patched expressions.
    pub exprs: ExprManager,
    /// The patched expression of every driver.
    pub drivers: Arena<AssignId, ExprId>,
}

impl Patched {
    /// The patched expression of driver `id`.
    pub fn expr(&self, id: AssignId) -> ExprId {
        self.drivers[id]
    }
}

/// Patches every driver of `module` for `phase`.
///
/// Only current-cycle reads of the clock are replaced; delayed reads are
/// registered state and stay as they are.
pub fn patch_clock(module: &ModuleExt, phase: Phase) -> Patched {
    let clocks: BTreeSet<_> = module
        .wires
        .iter()
        .filter(|(_, w)| w.global)
        .map(|(id, _)| id)
        .collect();
    let mut exprs = module.exprs.clone();
    let value = exprs.constant(Value::from_u64(phase.clock_value()));
    let drivers = module
        .drivers
        .values()
        .map(|d| {
            if clocks.is_empty() {
                return d.expr;
            }
            exprs.substitute(d.expr, |v| {
                let is_clock = matches!(v.name, VarName::Wire(w) if clocks.contains(&w));
                (is_clock && v.delay == 0).then_some(value)
            })
        })
        .collect();
    Patched { exprs, drivers }
}
