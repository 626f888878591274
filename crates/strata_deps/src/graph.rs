//! Dependency graph construction.

use crate::analyze::ModuleContext;
use crate::node::{Node, Phase};
use crate::patch::Patched;
use crate::report::SignalDeps;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{BTreeSet, HashSet};
use strata_common::Mask;
use strata_ir::{AssignId, ExprId, InstanceId, VarName, WireId};
use strata_model::Source;

/// Which signals are analyzed per bit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSet {
    all: bool,
    /// Split drivers.
    pub drivers: BTreeSet<AssignId>,
    /// Split port-instances.
    pub ports: BTreeSet<(InstanceId, WireId)>,
}

impl SplitSet {
    /// Nothing split: the crude graph.
    pub fn crude() -> SplitSet {
        SplitSet::default()
    }

    /// Everything split: the fine graph.
    pub fn fine() -> SplitSet {
        SplitSet {
            all: true,
            ..SplitSet::default()
        }
    }

    /// The given signals split.
    pub fn mixed(drivers: BTreeSet<AssignId>, ports: BTreeSet<(InstanceId, WireId)>) -> SplitSet {
        SplitSet {
            all: false,
            drivers,
            ports,
        }
    }

    /// Whether driver `id` is analyzed per bit.
    pub fn splits_driver(&self, id: AssignId) -> bool {
        self.all || self.drivers.contains(&id)
    }

    /// Whether port-instance `(inst, port)` is analyzed per bit.
    pub fn splits_port(&self, inst: InstanceId, port: WireId) -> bool {
        self.all || self.ports.contains(&(inst, port))
    }
}

/// A dependency graph of one module in one phase.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    graph: DiGraphMap<Node, ()>,
}

impl DepGraph {
    /// Builds a graph from explicit edges.
    pub fn from_edges(edges: &[(Node, Node)]) -> DepGraph {
        let mut graph = DiGraphMap::new();
        for &(from, to) in edges {
            graph.add_edge(from, to, ());
        }
        DepGraph { graph }
    }

    /// What `node` reads.
    pub fn successors(&self, node: Node) -> Vec<Node> {
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect()
    }

    /// Whether the graph has the vertex.
    pub fn contains_node(&self, node: Node) -> bool {
        self.graph.contains_node(node)
    }

    /// Whether `from` reads `to`.
    pub fn contains_edge(&self, from: Node, to: Node) -> bool {
        self.graph.contains_edge(from, to)
    }

    /// Number of vertices.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether any cycle exists, self loops included.
    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Vertices on a non-trivial strongly connected component or a self loop.
    pub fn cyclic_nodes(&self) -> BTreeSet<Node> {
        let mut out = BTreeSet::new();
        for scc in tarjan_scc(&self.graph) {
            match scc.as_slice() {
                [single] if !self.graph.contains_edge(*single, *single) => {}
                members => out.extend(members.iter().copied()),
            }
        }
        out
    }
}

/// Where resolution of a bit read currently stands.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Wire(WireId, u32),
    Port(InstanceId, WireId, u32),
}

/// Builds a dependency graph for one module, phase and split set.
pub struct GraphBuilder<'a> {
    ctx: &'a ModuleContext<'a>,
    patched: &'a Patched,
    phase: Phase,
    split: &'a SplitSet,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder.
    pub fn new(
        ctx: &'a ModuleContext<'a>,
        patched: &'a Patched,
        phase: Phase,
        split: &'a SplitSet,
    ) -> Self {
        Self {
            ctx,
            patched,
            phase,
            split,
        }
    }

    fn driver_node(&self, id: AssignId, bit: u32) -> Node {
        if self.split.splits_driver(id) {
            Node::DriverBit(id, bit)
        } else {
            Node::Driver(id)
        }
    }

    fn port_node(&self, inst: InstanceId, port: WireId, bit: u32) -> Node {
        if self.split.splits_port(inst, port) {
            Node::PortOutBit(inst, port, bit)
        } else {
            Node::PortOut(inst, port)
        }
    }

    /// Every driver and port-instance output at this builder's granularity.
    pub fn roots(&self) -> Vec<Node> {
        let m = self.ctx.module;
        let mut roots = Vec::new();
        for (id, d) in m.drivers.iter() {
            if self.split.splits_driver(id) {
                roots.extend((0..d.width()).map(|b| Node::DriverBit(id, b)));
            } else {
                roots.push(Node::Driver(id));
            }
        }
        for (iid, inst) in m.instances.iter() {
            for port in &inst.ports {
                if port.outputs.is_empty() {
                    continue;
                }
                if self.split.splits_port(iid, port.port) {
                    roots.extend(
                        port.outputs
                            .bits_below(port.width)
                            .map(|b| Node::PortOutBit(iid, port.port, b)),
                    );
                } else {
                    roots.push(Node::PortOut(iid, port.port));
                }
            }
        }
        roots
    }

    /// Builds the graph reachable from every root.
    pub fn build(&self) -> DepGraph {
        let mut graph = DiGraphMap::new();
        let mut done = HashSet::new();
        let mut work = self.roots();
        while let Some(node) = work.pop() {
            if !done.insert(node) {
                continue;
            }
            graph.add_node(node);
            for dep in self.deps_of(node) {
                graph.add_edge(node, dep, ());
                if !dep.is_leaf() && !done.contains(&dep) {
                    work.push(dep);
                }
            }
        }
        DepGraph { graph }
    }

    /// The direct dependencies of `node`.
    pub fn deps_of(&self, node: Node) -> BTreeSet<Node> {
        let mut out = BTreeSet::new();
        match node {
            Node::Driver(id) => {
                let width = self.ctx.module.drivers[id].width();
                self.expr_deps(self.patched.expr(id), &Mask::low(width), &mut out);
            }
            Node::DriverBit(id, bit) => {
                self.expr_deps(self.patched.expr(id), &Mask::bit(bit), &mut out);
            }
            Node::PortOut(inst, port) => {
                let module = self.ctx.module.instances[inst].module;
                if let Some(child) = self.ctx.child(module) {
                    let deps = child.output_deps(port, self.phase);
                    self.child_deps(inst, &deps, &mut out);
                }
            }
            Node::PortOutBit(inst, port, bit) => {
                let module = self.ctx.module.instances[inst].module;
                let deps = self
                    .ctx
                    .child(module)
                    .and_then(|c| c.outputs.get(&(port, bit)))
                    .map(|p| p.get(self.phase));
                if let Some(deps) = deps {
                    self.child_deps(inst, deps, &mut out);
                }
            }
            Node::Input(..) | Node::State => {}
        }
        out
    }

    fn expr_deps(&self, expr: ExprId, mask: &Mask, out: &mut BTreeSet<Node>) {
        for (var, bits) in self.patched.exprs.mask_vars(expr, mask) {
            if bits.is_empty() {
                continue;
            }
            if var.delay > 0 {
                out.insert(Node::State);
                continue;
            }
            let width = self.ctx.module.var_width(var.name).unwrap_or(0);
            for bit in bits.bits_below(width) {
                match var.name {
                    VarName::Wire(w) => self.resolve(Cursor::Wire(w, bit), out),
                    VarName::PortInst { inst, port } => self.resolve(Cursor::Port(inst, port, bit), out),
                    VarName::Flat(_) => {}
                }
            }
        }
    }

    /// Maps a child's report onto the instance's input port bits.
    fn child_deps(&self, inst: InstanceId, deps: &SignalDeps, out: &mut BTreeSet<Node>) {
        if deps.state {
            out.insert(Node::State);
        }
        let ports = &self.ctx.module.instances[inst].ports;
        for (&port, mask) in &deps.inputs {
            let Some(p) = ports.get(port.index()) else {
                continue;
            };
            for bit in mask.bits_below(p.width) {
                self.resolve(Cursor::Port(inst, port, bit), out);
            }
        }
    }

    /// The nodes producing bit `bit` of local wire `wire`.
    pub fn wire_bit_sources(&self, wire: WireId, bit: u32) -> BTreeSet<Node> {
        let mut out = BTreeSet::new();
        self.resolve(Cursor::Wire(wire, bit), &mut out);
        out
    }

    /// Follows alias runs from a bit to the node producing it.
    fn resolve(&self, mut cur: Cursor, out: &mut BTreeSet<Node>) {
        let m = self.ctx.module;
        loop {
            let source = match cur {
                Cursor::Wire(w, b) => {
                    let wire = &m.wires[w];
                    if wire.is_input(b) {
                        out.insert(Node::Input(w, b));
                        return;
                    }
                    wire.driver_at(b).map(|(lsb, run)| run.source.offset(b - lsb))
                }
                Cursor::Port(inst, port, b) => {
                    let Some(p) = m.instances[inst].port(port) else {
                        return;
                    };
                    if p.is_output(b) {
                        out.insert(self.port_node(inst, port, b));
                        return;
                    }
                    p.driver_at(b).map(|(lsb, run)| run.source.offset(b - lsb))
                }
            };
            match source {
                None | Some(Source::Z) => return,
                Some(Source::Driver { id, lsb }) => {
                    out.insert(self.driver_node(id, lsb));
                    return;
                }
                Some(Source::Wire { wire, lsb }) => cur = Cursor::Wire(wire, lsb),
                Some(Source::PortInst { inst, port, lsb }) => cur = Cursor::Port(inst, port, lsb),
            }
        }
    }
}
