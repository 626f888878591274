//! A combinational cycle is reported once and does not disturb the analysis
//! of signals off the cycle.

use strata_common::Mask;
use strata_conformance::{run_engine, DesignBuilder};
use strata_config::DesignHints;
use strata_diagnostics::Location;
use strata_ir::{Func, WireId};

/// `a = b & i`, `b = a | k`, and the independent `c = ~j`.
fn cyclic(hints_parallel: bool) -> (strata_conformance::RunResult, WireId, WireId) {
    let mut b = DesignBuilder::new();
    let mut ids = (WireId::from_raw(0), WireId::from_raw(0));
    b.module("m", |m| {
        let i = m.wire("i", 1);
        let j = m.wire("j", 1);
        let a = m.wire("a", 1);
        let bw = m.wire("b", 1);
        let c = m.wire("c", 1);
        let k = m.wire("k", 1);
        let (ei, ej, ea, eb, ek) = (m.read(i), m.read(j), m.read(a), m.read(bw), m.read(k));
        let and = m.call(Func::BitAnd, vec![eb, ei]);
        m.assign_wire(a, and);
        let or = m.call(Func::BitOr, vec![ea, ek]);
        m.assign_wire(bw, or);
        let not = m.call(Func::BitNot, vec![ej]);
        m.assign_wire(c, not);
        ids = (j, c);
    });
    let (names, design) = b.finish();
    let mut hints = DesignHints::default();
    hints.engine.parallel = hints_parallel;
    (run_engine(&names, &design, &hints), ids.0, ids.1)
}

#[test]
fn exactly_one_cycle_diagnostic() {
    let (result, _, _) = cyclic(false);
    let cycles = result.cycles();
    assert_eq!(cycles.len(), 1, "{:?}", result.diagnostics);
    assert_eq!(cycles[0].message, "combinational cycle through a, b");
    assert_eq!(cycles[0].location, Location::signal("m", "a"));
    assert_eq!(result.warning_count, 1);
}

#[test]
fn independent_signal_is_exact() {
    for parallel in [false, true] {
        let (result, j, c) = cyclic(parallel);
        let compiled = result.compiled();
        let deps = &compiled.reports[compiled.model.top];
        for phase in [&deps.outputs[&(c, 0)].low, &deps.outputs[&(c, 0)].high] {
            assert!(!phase.state);
            assert_eq!(phase.inputs.len(), 1);
            assert_eq!(phase.inputs[&j], Mask::bit(0));
        }
    }
}

#[test]
fn cyclic_signals_report_inputs_from_both_sides() {
    let (result, _, _) = cyclic(false);
    let compiled = result.compiled();
    let deps = &compiled.reports[compiled.model.top];
    let (i, a, b, k) = (
        WireId::from_raw(0),
        WireId::from_raw(2),
        WireId::from_raw(3),
        WireId::from_raw(5),
    );
    let drivers = compiled.model.top_module().drivers.ids();
    let mut reports = vec![&deps.outputs[&(a, 0)], &deps.outputs[&(b, 0)]];
    reports.extend(drivers.take(2).map(|id| &deps.drivers[&id]));
    for report in reports {
        for phase in [&report.low, &report.high] {
            assert!(!phase.state);
            assert_eq!(phase.inputs.get(&i), Some(&Mask::bit(0)), "{phase:?}");
            assert_eq!(phase.inputs.get(&k), Some(&Mask::bit(0)), "{phase:?}");
        }
    }
    assert!(!deps.has_phase_state);
}
