//! Whole-signal analysis of an instance output merges its bits and can
//! report a cycle that does not exist; per-bit re-analysis removes it.

use std::collections::BTreeSet;
use strata_common::Mask;
use strata_conformance::{bits, run_engine, DesignBuilder, RunResult};
use strata_config::DesignHints;
use strata_deps::graph::GraphBuilder;
use strata_deps::patch::patch_clock;
use strata_deps::{ModuleContext, ModuleDeps, Node, Phase, SplitSet};
use strata_ir::{Func, InstanceId, VarName, WireId};

/// `rot` rotates its 4-bit input: `o[0] = i[3]`, `o[k] = i[k - 1]`.
/// `top` feeds `u.o[0]` back into `u.i[0]` and drives `u.i[3:1]` from pins.
fn feedback() -> (strata_common::Interner, RunResult) {
    let mut b = DesignBuilder::new();
    let rot = b.module("rot", |m| {
        let i = m.wire("i", 4);
        let o = m.wire("o", 4);
        let ei = m.read(i);
        let top_bit = m.bit(ei, 3);
        let one = m.constant(1);
        let rotated = m.call(Func::Concat, vec![one, top_bit, ei]);
        m.assign_wire(o, rotated);
    });
    b.module("top", |m| {
        let pins = m.wire("pins", 3);
        let out = m.wire("out", 4);
        let u = m.inst("u", rot);
        let (ui, uo) = (m.port(u, "i"), m.port(u, "o"));
        m.alias(bits(ui, 0, 1), bits(uo, 0, 1));
        m.alias(bits(ui, 1, 3), bits(VarName::Wire(pins), 0, 3));
        m.alias(bits(VarName::Wire(out), 0, 4), bits(uo, 0, 4));
    });
    let (names, design) = b.finish();
    let result = run_engine(&names, &design, &DesignHints::default());
    (names, result)
}

fn port_o() -> (InstanceId, WireId) {
    (InstanceId::from_raw(0), WireId::from_raw(1))
}

#[test]
fn child_output_bit_zero_reads_only_input_bit_three() {
    let (_, result) = feedback();
    let compiled = result.compiled();
    let rot = compiled.model.order[0];
    let deps = &compiled.reports[rot];
    let o0 = &deps.outputs[&(WireId::from_raw(1), 0)].high;
    assert_eq!(o0.inputs[&WireId::from_raw(0)], Mask::bit(3));
    // The whole-signal view merges every input bit.
    assert_eq!(
        deps.output_deps(WireId::from_raw(1), Phase::High).inputs[&WireId::from_raw(0)],
        Mask::low(4)
    );
}

#[test]
fn false_self_loop_is_split_away() {
    let (names, result) = feedback();
    assert!(result.cycles().is_empty(), "{:?}", result.diagnostics);
    let compiled = result.compiled();
    let model = &compiled.model;
    let top = model.top;
    let (inst, port) = port_o();
    assert!(compiled.reports[top].split_ports.contains(&(inst, port)));

    let children: Vec<Option<ModuleDeps>> = compiled.reports.values().cloned().map(Some).collect();
    let ctx = ModuleContext::new(model, top, &names, &children);
    let patched = patch_clock(ctx.module, Phase::High);

    let crude = SplitSet::crude();
    let crude_graph = GraphBuilder::new(&ctx, &patched, Phase::High, &crude).build();
    let whole = Node::PortOut(inst, port);
    assert!(crude_graph.contains_edge(whole, whole));

    let mixed = SplitSet::mixed(BTreeSet::new(), compiled.reports[top].split_ports.clone());
    let graph = GraphBuilder::new(&ctx, &patched, Phase::High, &mixed).build();
    let bit0 = Node::PortOutBit(inst, port, 0);
    assert!(graph.contains_node(bit0));
    assert!(!graph.contains_edge(bit0, bit0));
    assert!(!graph.is_cyclic());
}

#[test]
fn parent_report_sees_through_the_feedback() {
    let (_, result) = feedback();
    let compiled = result.compiled();
    let deps = &compiled.reports[compiled.model.top];
    let pins = WireId::from_raw(0);
    let out = WireId::from_raw(1);
    // out[0] = i[3] = pins[2]; out[1] = i[0] = out[0].
    for bit in [0, 1] {
        assert_eq!(deps.outputs[&(out, bit)].low.inputs[&pins], Mask::bit(2));
    }
    assert_eq!(deps.outputs[&(out, 2)].low.inputs[&pins], Mask::bit(0));
}
