//! Per-module dependency analysis and the leaves-first design pass.

use crate::closure::Closure;
use crate::errors::{warn_comb_cycle, warn_unknown_split};
use crate::graph::{GraphBuilder, SplitSet};
use crate::node::{Node, Phase};
use crate::patch::{patch_clock, Patched};
use crate::report::{ModuleDeps, Phased, SignalDeps};
use rayon::prelude::*;
use std::collections::BTreeSet;
use strata_common::Interner;
use strata_config::DesignHints;
use strata_diagnostics::DiagnosticSink;
use strata_ir::{Arena, AssignId, InstanceId, LhAtom, ModuleId, VarName, WireId};
use strata_model::{Model, ModuleExt};
use tracing::{debug, trace};

/// Everything the analysis of one module reads.
pub struct ModuleContext<'a> {
    /// The whole model.
    pub model: &'a Model,
    /// The module being analyzed.
    pub module: &'a ModuleExt,
    /// Name table of the design.
    pub names: &'a Interner,
    /// Results of already analyzed modules, indexed by module.
    pub children: &'a [Option<ModuleDeps>],
}

impl<'a> ModuleContext<'a> {
    /// Creates the context for `module`.
    pub fn new(
        model: &'a Model,
        module: ModuleId,
        names: &'a Interner,
        children: &'a [Option<ModuleDeps>],
    ) -> Self {
        Self {
            model,
            module: model.module(module),
            names,
            children,
        }
    }

    /// The result of an already analyzed module.
    pub fn child(&self, module: ModuleId) -> Option<&ModuleDeps> {
        self.children.get(module.index())?.as_ref()
    }

    /// The module's name.
    pub fn module_name(&self) -> &str {
        self.names.resolve(self.module.name)
    }

    /// Display name of a local variable, with port names taken from the
    /// prototype.
    pub fn var_name(&self, name: VarName) -> String {
        match name {
            VarName::PortInst { inst, port } => {
                let Some(instance) = self.module.instances.try_get(inst) else {
                    return name.to_string();
                };
                let proto = self.model.module(instance.module);
                let port_name = proto
                    .wires
                    .try_get(port)
                    .map_or_else(|| port.to_string(), |w| self.names.resolve(w.name).to_string());
                format!("{}.{port_name}", self.names.resolve(instance.name))
            }
            _ => self.module.var_display(self.names, name),
        }
    }

    /// Name of the signal a node stands for, ignoring bit positions.
    pub fn signal_name(&self, node: Node) -> String {
        match node {
            Node::Driver(id) | Node::DriverBit(id, _) => self.driver_name(id),
            Node::PortOut(inst, port) | Node::PortOutBit(inst, port, _) => {
                self.var_name(VarName::PortInst { inst, port })
            }
            Node::Input(wire, _) => self.var_name(VarName::Wire(wire)),
            Node::State => "STATE".to_string(),
        }
    }

    /// A driver is named by the first variable it drives.
    pub fn driver_name(&self, id: AssignId) -> String {
        let first = self.module.drivers.try_get(id).and_then(|d| {
            d.lhs.ranges().iter().find_map(|r| match r.atom {
                LhAtom::Var { name, .. } => Some(name),
                LhAtom::Z => None,
            })
        });
        match first {
            Some(name) => self.var_name(name),
            None => id.to_string(),
        }
    }

    fn find_port(&self, entry: &str) -> Option<(InstanceId, WireId)> {
        let (inst_name, port_name) = entry.split_once('.')?;
        let (iid, inst) = self
            .module
            .instances
            .iter()
            .find(|(_, i)| self.names.resolve(i.name) == inst_name)?;
        let proto = self.model.module(inst.module);
        let port = proto
            .export_ids()
            .find(|&p| self.names.resolve(proto.wires[p].name) == port_name)?;
        Some((iid, port))
    }

    fn drivers_of_wire(&self, wire_name: &str) -> Vec<AssignId> {
        self.module
            .drivers
            .ids()
            .filter(|&id| self.driver_name(id) == wire_name)
            .collect()
    }
}

/// Signals the hints force to be split.
fn forced_splits(
    ctx: &ModuleContext<'_>,
    hints: &DesignHints,
    sink: &DiagnosticSink,
) -> (BTreeSet<AssignId>, BTreeSet<(InstanceId, WireId)>) {
    let module = ctx.module_name();
    let mut ports = BTreeSet::new();
    for entry in hints.split_port_insts(module) {
        match ctx.find_port(entry) {
            Some(port) => {
                ports.insert(port);
            }
            None => sink.emit(warn_unknown_split(module, "port-instance", entry)),
        }
    }
    let mut drivers = BTreeSet::new();
    for wire in hints.split_drivers(module) {
        let found = ctx.drivers_of_wire(wire);
        if found.is_empty() {
            sink.emit(warn_unknown_split(module, "driver", wire));
        }
        drivers.extend(found);
    }
    (drivers, ports)
}

/// Analyzes one module whose instantiated modules are all analyzed.
pub fn analyze_module(
    ctx: &ModuleContext<'_>,
    hints: &DesignHints,
    sink: &DiagnosticSink,
) -> ModuleDeps {
    let module = ctx.module;
    let module_name = ctx.module_name();
    let patched = Phased {
        low: patch_clock(module, Phase::Low),
        high: patch_clock(module, Phase::High),
    };

    // Split marking on the crude graphs.
    let (mut split_drivers, mut split_ports) = forced_splits(ctx, hints, sink);
    let crude = SplitSet::crude();
    for phase in Phase::ALL {
        let graph = GraphBuilder::new(ctx, patched.get(phase), phase, &crude).build();
        for node in graph.cyclic_nodes() {
            match node {
                Node::Driver(id) => {
                    split_drivers.insert(id);
                }
                Node::PortOut(inst, port) => {
                    split_ports.insert((inst, port));
                }
                _ => {}
            }
        }
    }
    if !split_drivers.is_empty() || !split_ports.is_empty() {
        debug!(
            module = module_name,
            drivers = split_drivers.len(),
            ports = split_ports.len(),
            "marked signals for per-bit analysis"
        );
    }
    let split = SplitSet::mixed(split_drivers, split_ports);

    let mut deps = ModuleDeps::new(module.id);
    let mut reported: BTreeSet<BTreeSet<String>> = BTreeSet::new();
    for phase in Phase::ALL {
        let builder = GraphBuilder::new(ctx, patched.get(phase), phase, &split);
        let graph = builder.build();
        trace!(
            module = module_name,
            %phase,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "mixed dependency graph"
        );
        let mut closure = Closure::new(&graph);
        for (id, driver) in module.drivers.iter() {
            let nodes: Vec<Node> = if split.splits_driver(id) {
                (0..driver.width()).map(|b| Node::DriverBit(id, b)).collect()
            } else {
                vec![Node::Driver(id)]
            };
            let report = signal_deps(&mut closure, nodes);
            *deps.drivers.entry(id).or_default().get_mut(phase) = report;
        }
        for root in builder.roots() {
            closure.leaves(root);
        }
        for cycle in closure.take_cycles() {
            let members: BTreeSet<String> = cycle.iter().map(|&n| ctx.signal_name(n)).collect();
            trace!(module = module_name, %phase, ?cycle, "combinational cycle");
            if reported.insert(members.clone()) {
                let members: Vec<String> = members.into_iter().collect();
                sink.emit(warn_comb_cycle(module_name, &members, phase));
            }
        }
    }

    // Export reports on the fine graphs.
    let fine = SplitSet::fine();
    for phase in Phase::ALL {
        let builder = GraphBuilder::new(ctx, patched.get(phase), phase, &fine);
        let graph = builder.build();
        let mut closure = Closure::new(&graph);
        for wire in module.export_ids() {
            let outputs = module.wires[wire].output_mask();
            for bit in outputs.bits_below(module.wires[wire].width) {
                let nodes = builder.wire_bit_sources(wire, bit);
                let report = signal_deps(&mut closure, nodes);
                *deps.outputs.entry((wire, bit)).or_default().get_mut(phase) = report;
            }
        }
    }

    deps.split_drivers = split.drivers;
    deps.split_ports = split.ports;
    deps.has_phase_state = deps
        .outputs
        .values()
        .any(|p| p.low.state || p.high.state);
    deps.has_cycle_state = deps.outputs.values().any(|p| p.low.state);
    for inst in module.instances.values() {
        if let Some(child) = ctx.child(inst.module) {
            deps.has_phase_state |= child.has_phase_state;
            deps.has_cycle_state |= child.has_cycle_state;
        }
    }
    debug!(
        module = module_name,
        outputs = deps.outputs.len(),
        drivers = deps.drivers.len(),
        has_phase_state = deps.has_phase_state,
        has_cycle_state = deps.has_cycle_state,
        "analyzed module"
    );
    deps
}

fn signal_deps(closure: &mut Closure<'_>, nodes: impl IntoIterator<Item = Node>) -> SignalDeps {
    let mut report = SignalDeps::default();
    for node in nodes {
        report.union_with(&SignalDeps::from_leaves(&closure.leaves(node)));
    }
    report
}

/// Analyzes every module, leaves first.
///
/// With `parallel`, the modules of each instantiation level are analyzed
/// on the rayon pool; a level starts only after the previous one is done.
pub fn analyze_design(
    model: &Model,
    names: &Interner,
    hints: &DesignHints,
    sink: &DiagnosticSink,
    parallel: bool,
) -> Arena<ModuleId, ModuleDeps> {
    let mut results: Vec<Option<ModuleDeps>> = vec![None; model.modules.len()];
    for (depth, level) in model.levels.iter().enumerate() {
        let done: Vec<ModuleDeps> = if parallel {
            level
                .par_iter()
                .map(|&id| analyze_module(&ModuleContext::new(model, id, names, &results), hints, sink))
                .collect()
        } else {
            level
                .iter()
                .map(|&id| analyze_module(&ModuleContext::new(model, id, names, &results), hints, sink))
                .collect()
        };
        trace!(depth, modules = done.len(), "dependency level done");
        for deps in done {
            let index = deps.module.index();
            results[index] = Some(deps);
        }
    }
    results
        .into_iter()
        .zip(model.modules.ids())
        .map(|(deps, id)| deps.unwrap_or_else(|| ModuleDeps::new(id)))
        .collect()
}
