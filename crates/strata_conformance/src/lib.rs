//! Conformance test helpers for the Strata engine.
//!
//! Provides builders for small hand-written designs and a helper that runs
//! the whole engine on one, returning structured results for assertion in
//! integration tests.

#![warn(missing_docs)]

use strata_common::{Interner, Value};
use strata_config::DesignHints;
use strata_diagnostics::{codes, Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use strata_engine::{CompiledDesign, EngineError};
use strata_ir::{
    Design, ExprId, Func, InstanceId, Lhrange, Lhs, Module, ModuleId, VarName, Variable, WireId,
    STRENGTH_DEFAULT,
};

/// Result of running the engine on a design.
pub struct RunResult {
    /// The engine output, or the fatal error.
    pub outcome: Result<CompiledDesign, EngineError>,
    /// All diagnostics emitted during the run.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl RunResult {
    /// The engine output; panics with the error if the run failed.
    pub fn compiled(&self) -> &CompiledDesign {
        match &self.outcome {
            Ok(c) => c,
            Err(e) => panic!("engine failed: {e}"),
        }
    }

    /// Diagnostics with the given code.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }

    /// The combinational cycle warnings.
    pub fn cycles(&self) -> Vec<&Diagnostic> {
        self.with_code(codes::W300)
    }
}

/// Hints with every self-consistency check enabled.
pub fn verify_hints() -> DesignHints {
    let mut hints = DesignHints::default();
    hints.engine.verify = true;
    hints
}

/// Runs the whole engine on `design`.
pub fn run_engine(names: &Interner, design: &Design, hints: &DesignHints) -> RunResult {
    let sink = DiagnosticSink::new();
    let outcome = strata_engine::run(design, names, hints, &sink);
    let diagnostics = sink.take_all();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    RunResult {
        outcome,
        diagnostics,
        warning_count,
    }
}

/// Builds a design module by module, prototypes first.
#[derive(Default)]
pub struct DesignBuilder {
    names: Interner,
    design: Design,
}

impl DesignBuilder {
    /// An empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// The name table.
    pub fn names(&self) -> &Interner {
        &self.names
    }

    /// Adds a module built by `f`; the last module added is the top.
    pub fn module(&mut self, name: &str, f: impl FnOnce(&mut ModuleBuilder<'_>)) -> ModuleId {
        let mut builder = ModuleBuilder {
            names: &self.names,
            design: &self.design,
            module: Module::new(self.names.get_or_intern(name)),
        };
        f(&mut builder);
        let module = builder.module;
        let id = self.design.add_module(module);
        self.design.top = id;
        id
    }

    /// Makes `id` the top module.
    pub fn set_top(&mut self, id: ModuleId) {
        self.design.top = id;
    }

    /// The finished design and its names.
    pub fn finish(self) -> (Interner, Design) {
        (self.names, self.design)
    }
}

/// Builds one module, with names resolved through the design's interner.
pub struct ModuleBuilder<'a> {
    names: &'a Interner,
    design: &'a Design,
    module: Module,
}

impl ModuleBuilder<'_> {
    /// Adds a wire.
    pub fn wire(&mut self, name: &str, width: u32) -> WireId {
        self.module.add_wire(self.names.get_or_intern(name), width)
    }

    /// Adds an instance of an already built module.
    pub fn inst(&mut self, name: &str, proto: ModuleId) -> InstanceId {
        self.module.add_instance(self.names.get_or_intern(name), proto)
    }

    /// The port-instance `inst.port`.
    ///
    /// # Panics
    ///
    /// Panics if the prototype has no wire named `port`.
    pub fn port(&self, inst: InstanceId, port: &str) -> VarName {
        let proto = self.design.module(self.module.instances[inst].module);
        let port = proto
            .find_wire(self.names.get_or_intern(port))
            .unwrap_or_else(|| panic!("no port {port}"));
        VarName::PortInst { inst, port }
    }

    /// Reads a whole wire.
    pub fn read(&mut self, wire: WireId) -> ExprId {
        self.module.exprs.var(Variable::wire(wire))
    }

    /// Reads `name` as it was `delay` cycles ago.
    pub fn read_delayed(&mut self, name: VarName, delay: u32) -> ExprId {
        self.module.exprs.var(Variable::delayed(name, delay))
    }

    /// Bit `bit` of `expr`.
    pub fn bit(&mut self, expr: ExprId, bit: u32) -> ExprId {
        let index = self.module.exprs.constant(Value::from_u64(u64::from(bit)));
        self.module.exprs.call(Func::BitSel, vec![index, expr])
    }

    /// A constant.
    pub fn constant(&mut self, value: u64) -> ExprId {
        self.module.exprs.constant(Value::from_u64(value))
    }

    /// A function call.
    pub fn call(&mut self, func: Func, args: Vec<ExprId>) -> ExprId {
        self.module.exprs.call(func, args)
    }

    /// Drives `target` from `expr` with the default strength.
    pub fn assign(&mut self, target: Lhs, expr: ExprId) {
        self.module.add_assign(target, expr, STRENGTH_DEFAULT);
    }

    /// Drives all of `wire` from `expr`.
    pub fn assign_wire(&mut self, wire: WireId, expr: ExprId) {
        let width = self.module.wires[wire].width;
        self.assign(Lhs::var(VarName::Wire(wire), width), expr);
    }

    /// Connects two bit lists.
    pub fn alias(&mut self, lhs: Lhs, rhs: Lhs) {
        self.module.add_alias(lhs, rhs);
    }

    /// Connects all of `wire` to the port-instance `inst.port`.
    pub fn connect(&mut self, inst: InstanceId, port: &str, wire: WireId) {
        let width = self.module.wires[wire].width;
        let port = self.port(inst, port);
        self.alias(Lhs::var(port, width), Lhs::var(VarName::Wire(wire), width));
    }
}

/// Bits `lsb..lsb + width` of `name`.
pub fn bits(name: VarName, lsb: u32, width: u32) -> Lhs {
    Lhs(vec![Lhrange::var(name, lsb, width)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_connects_ports() {
        let mut b = DesignBuilder::new();
        let leaf = b.module("leaf", |m| {
            let a = m.wire("a", 2);
            let y = m.wire("y", 2);
            let e = m.read(a);
            m.assign_wire(y, e);
        });
        b.module("top", |m| {
            let x = m.wire("x", 2);
            let u = m.inst("u", leaf);
            m.connect(u, "a", x);
            assert_eq!(
                m.port(u, "y"),
                VarName::PortInst {
                    inst: u,
                    port: WireId::from_raw(1)
                }
            );
        });
        let (names, design) = b.finish();
        let top = design.module(design.top);
        assert_eq!(names.resolve(top.name), "top");
        assert_eq!(top.aliases.len(), 1);
        assert!(design.validate().is_ok());
    }
}
