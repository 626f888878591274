//! Every bit has at most one driver; overlapping assignments are structural
//! errors.

use strata_conformance::{bits, run_engine, verify_hints, DesignBuilder};
use strata_diagnostics::codes;
use strata_engine::EngineError;
use strata_ir::VarName;
use strata_model::ModelError;

#[test]
fn disjoint_ranges_partition_the_wire() {
    let mut b = DesignBuilder::new();
    b.module("top", |m| {
        let a = m.wire("a", 4);
        let y = m.wire("y", 8);
        let ea = m.read(a);
        m.assign(bits(VarName::Wire(y), 0, 4), ea);
        let one = m.constant(1);
        m.assign(bits(VarName::Wire(y), 4, 2), one);
        m.assign(bits(VarName::Wire(y), 6, 2), ea);
    });
    let (names, design) = b.finish();
    let result = run_engine(&names, &design, &verify_hints());
    let compiled = result.compiled();
    let top = compiled.model.top_module();
    let y = top.wires.iter().find(|(_, w)| names.resolve(w.name) == "y").unwrap().1;
    assert_eq!(y.drivers.len(), 3);
    let mut covered = 0;
    for (&lsb, run) in &y.drivers {
        assert_eq!(lsb, covered, "runs must tile the wire without overlap");
        covered += run.width;
    }
    assert_eq!(covered, 8);
}

#[test]
fn overlapping_ranges_are_rejected() {
    let mut b = DesignBuilder::new();
    b.module("top", |m| {
        let a = m.wire("a", 4);
        let y = m.wire("y", 8);
        let ea = m.read(a);
        m.assign(bits(VarName::Wire(y), 0, 4), ea);
        m.assign(bits(VarName::Wire(y), 3, 4), ea);
    });
    let (names, design) = b.finish();
    let result = run_engine(&names, &design, &verify_hints());
    match &result.outcome {
        Err(EngineError::Model(e)) => {
            let ModelError::Consistency { module, message } = e else {
                panic!("expected a consistency error, got {e}");
            };
            assert_eq!(module, "top");
            assert_eq!(message, "double assignment to y[3]");
            assert_eq!(e.to_diagnostic().code, codes::E300);
        }
        other => panic!("expected a consistency error, got {:?}", other.as_ref().err()),
    }
}

#[test]
fn alias_onto_assigned_bits_is_an_overlap() {
    let mut b = DesignBuilder::new();
    b.module("top", |m| {
        let a = m.wire("a", 2);
        let x = m.wire("x", 2);
        let y = m.wire("y", 2);
        let ea = m.read(a);
        m.assign_wire(x, ea);
        m.assign_wire(y, ea);
        m.alias(bits(VarName::Wire(x), 0, 2), bits(VarName::Wire(y), 0, 2));
    });
    let (names, design) = b.finish();
    let result = run_engine(&names, &design, &verify_hints());
    match &result.outcome {
        Err(EngineError::Model(e)) => {
            assert!(matches!(e, ModelError::Overlap { .. }), "{e}");
            assert_eq!(e.to_diagnostic().code, codes::E301);
        }
        other => panic!("expected an overlap error, got {:?}", other.as_ref().err()),
    }
}
