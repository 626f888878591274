//! The compiled net table survives serialization unchanged.

use strata_conformance::{bits, run_engine, verify_hints, DesignBuilder};
use strata_flatten::{verify_compiled, CompiledNets};
use strata_ir::{Func, VarName};

#[test]
fn compiled_nets_round_trip_through_json() {
    let mut b = DesignBuilder::new();
    let leaf = b.module("leaf", |m| {
        let a = m.wire("a", 4);
        let s = m.wire("s", 1);
        let y = m.wire("y", 4);
        let (ea, es) = (m.read(a), m.read(s));
        let prev = m.read_delayed(VarName::Wire(y), 1);
        let next = m.call(Func::Ite, vec![es, ea, prev]);
        m.assign_wire(y, next);
    });
    b.module("top", |m| {
        let x = m.wire("x", 4);
        let en = m.wire("en", 1);
        let y = m.wire("y", 8);
        let u0 = m.inst("u0", leaf);
        let u1 = m.inst("u1", leaf);
        for u in [u0, u1] {
            m.connect(u, "a", x);
            m.connect(u, "s", en);
        }
        let (y0, y1) = (m.port(u0, "y"), m.port(u1, "y"));
        m.alias(bits(VarName::Wire(y), 0, 4), bits(y0, 0, 4));
        m.alias(bits(VarName::Wire(y), 4, 4), bits(y1, 0, 4));
    });
    let (names, design) = b.finish();
    let result = run_engine(&names, &design, &verify_hints());
    let nets = &result.compiled().compiled;

    let json = serde_json::to_string(nets).unwrap();
    let back: CompiledNets = serde_json::from_str(&json).unwrap();

    assert_eq!(back.hierarchy, nets.hierarchy);
    assert_eq!(back.aliases, nets.aliases);
    assert_eq!(back.norm_assigns, nets.norm_assigns);
    assert_eq!(back.net_assigns, nets.net_assigns);
    assert_eq!(back.res_assigns, nets.res_assigns);
    assert_eq!(back.res_delays, nets.res_delays);
    for (slot, &expr) in &nets.res_assigns {
        assert!(nets.exprs.structurally_equal(expr, &back.exprs, back.res_assigns[slot]));
        assert_eq!(
            back.hierarchy.slots[*slot as usize].width,
            nets.hierarchy.slots[*slot as usize].width
        );
    }
    verify_compiled(&back).unwrap();
}
