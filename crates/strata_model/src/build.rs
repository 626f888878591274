//! Leaves-first construction of the model.

use crate::error::ModelError;
use crate::exports::compute_exports;
use crate::resolve::BitRef;
use crate::types::*;
use strata_common::{Interner, Mask};
use strata_config::DesignHints;
use strata_ir::{
    Arena, AssignId, Design, DesignError, InstanceId, LhAtom, Lhs, Module, ModuleId, VarName, WireId,
};
use tracing::debug;

/// The checked, alias-resolved hierarchy of a design.
#[derive(Debug, Clone)]
pub struct Model {
    /// Every module, indexed like the raw design.
    pub modules: Arena<ModuleId, ModuleExt>,
    /// The top module.
    pub top: ModuleId,
    /// Modules ordered so each follows all its prototypes.
    pub order: Vec<ModuleId>,
    /// The same order grouped by instantiation depth.
    pub levels: Vec<Vec<ModuleId>>,
}

impl Model {
    /// Checks and resolves every module of `design`, leaves first.
    pub fn build(design: &Design, names: &Interner, hints: &DesignHints) -> Result<Model, ModelError> {
        design.validate()?;
        let order = design.leaves_first()?;
        let levels = design.levels()?;
        let exports = compute_exports(design, names, hints)?;

        let mut built: Vec<Option<ModuleExt>> = vec![None; design.modules.len()];
        for &id in &order {
            let builder = ModuleBuilder::new(design, id, names, hints, exports[id.index()], &built)?;
            let ext = builder.finish()?;
            debug!(
                module = names.resolve(ext.name),
                wires = ext.wires.len(),
                exports = ext.exports,
                drivers = ext.drivers.len(),
                "built module"
            );
            built[id.index()] = Some(ext);
        }

        let modules = built
            .into_iter()
            .collect::<Option<Arena<ModuleId, ModuleExt>>>()
            .ok_or_else(|| DesignError::Malformed("module missing from build order".into()))?;
        Ok(Model {
            modules,
            top: design.top,
            order,
            levels,
        })
    }

    /// The module with the given ID.
    pub fn module(&self, id: ModuleId) -> &ModuleExt {
        &self.modules[id]
    }

    /// The top module.
    pub fn top_module(&self) -> &ModuleExt {
        &self.modules[self.top]
    }
}

/// Builds one module once all its prototypes are built.
pub(crate) struct ModuleBuilder<'a> {
    pub(crate) id: ModuleId,
    pub(crate) raw: &'a Module,
    pub(crate) names: &'a Interner,
    pub(crate) module_name: &'a str,
    pub(crate) protos: &'a [Option<ModuleExt>],
    pub(crate) exports: u32,
    pub(crate) wires: Vec<WireExt>,
    pub(crate) instances: Vec<InstanceExt>,
    /// Per-wire, per-bit sources.
    pub(crate) wire_bits: Vec<Vec<Option<Source>>>,
    /// Per-instance, per-port, per-bit sources of input bits.
    pub(crate) port_bits: Vec<Vec<Vec<Option<Source>>>>,
    /// Export bits promoted to inputs during alias resolution.
    pub(crate) promoted: Vec<Mask>,
}

impl<'a> ModuleBuilder<'a> {
    fn new(
        design: &'a Design,
        id: ModuleId,
        names: &'a Interner,
        hints: &DesignHints,
        exports: u32,
        protos: &'a [Option<ModuleExt>],
    ) -> Result<Self, ModelError> {
        let raw = design.module(id);
        let module_name = names.resolve(raw.name);
        if exports as usize > raw.wires.len() {
            return Err(ModelError::consistency(
                module_name,
                format!(
                    "a parent connects port {} but the module has {} wires",
                    exports - 1,
                    raw.wires.len()
                ),
            ));
        }

        let mut wires = Vec::with_capacity(raw.wires.len());
        for (wid, wire) in raw.wires.iter() {
            let wire_name = names.resolve(wire.name);
            if wire.width == 0 {
                return Err(ModelError::consistency(
                    module_name,
                    format!("wire {wire_name} has zero width"),
                ));
            }
            wires.push(WireExt {
                name: wire.name,
                width: wire.width,
                low_idx: wire.low_idx,
                export: wid.as_raw() < exports,
                global: wire_name == hints.clock.name,
                assigned: Mask::none(),
                drivers: DriverMap::new(),
            });
        }

        let mut instances = Vec::with_capacity(raw.instances.len());
        for (iid, inst) in raw.instances.iter() {
            let proto = protos
                .get(inst.module.index())
                .and_then(Option::as_ref)
                .ok_or(DesignError::UnknownModule {
                    parent: id,
                    instance: iid,
                    target: inst.module,
                })?;
            let ports = proto
                .export_ids()
                .map(|p| {
                    let wire = &proto.wires[p];
                    PortInst {
                        port: p,
                        width: wire.width,
                        outputs: wire.output_mask(),
                        assigned: Mask::none(),
                        drivers: DriverMap::new(),
                    }
                })
                .collect();
            instances.push(InstanceExt {
                name: inst.name,
                module: inst.module,
                ports,
            });
        }

        let wire_bits = wires.iter().map(|w| vec![None; w.width as usize]).collect();
        let port_bits = instances
            .iter()
            .map(|i| i.ports.iter().map(|p| vec![None; p.width as usize]).collect())
            .collect();
        let promoted = vec![Mask::none(); wires.len()];
        Ok(Self {
            id,
            raw,
            names,
            module_name,
            protos,
            exports,
            wires,
            instances,
            wire_bits,
            port_bits,
            promoted,
        })
    }

    fn finish(mut self) -> Result<ModuleExt, ModelError> {
        let drivers = self.check_drivers()?;
        self.assign_bits()?;
        for alias in &self.raw.aliases {
            self.check_lhs(&alias.lhs)?;
            self.check_lhs(&alias.rhs)?;
            if alias.lhs.width() != alias.rhs.width() {
                return Err(self.error(format!(
                    "alias sides have widths {} and {}",
                    alias.lhs.width(),
                    alias.rhs.width()
                )));
            }
        }
        self.resolve_aliases()?;

        for (wire, bits) in self.wires.iter_mut().zip(&self.wire_bits) {
            wire.drivers = group_runs(bits);
        }
        for (inst, ports) in self.instances.iter_mut().zip(&self.port_bits) {
            for (port, bits) in inst.ports.iter_mut().zip(ports) {
                port.drivers = group_runs(bits);
            }
        }

        let total_wires = self.wires.len() as u32
            + self
                .instances
                .iter()
                .filter_map(|i| self.protos.get(i.module.index()).and_then(Option::as_ref))
                .map(|p| p.total_wires)
                .sum::<u32>();
        Ok(ModuleExt {
            id: self.id,
            name: self.raw.name,
            wires: self.wires.into_iter().collect(),
            instances: self.instances.into_iter().collect(),
            drivers,
            exports: self.exports,
            total_wires,
            exprs: self.raw.exprs.clone(),
        })
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ModelError {
        ModelError::consistency(self.module_name, message)
    }

    fn var_width(&self, name: VarName) -> Option<u32> {
        match name {
            VarName::Wire(w) => self.wires.get(w.index()).map(|w| w.width),
            VarName::PortInst { inst, port } => self
                .instances
                .get(inst.index())?
                .ports
                .get(port.index())
                .map(|p| p.width),
            VarName::Flat(_) => None,
        }
    }

    fn var_display(&self, name: VarName) -> String {
        match name {
            VarName::Wire(w) => match self.wires.get(w.index()) {
                Some(wire) => self.names.resolve(wire.name).to_string(),
                None => w.to_string(),
            },
            VarName::PortInst { inst, port } => {
                let Some(instance) = self.instances.get(inst.index()) else {
                    return format!("{inst}.{port}");
                };
                let port_name = self
                    .protos
                    .get(instance.module.index())
                    .and_then(Option::as_ref)
                    .and_then(|p| p.wires.try_get(port))
                    .map_or_else(|| port.to_string(), |w| self.names.resolve(w.name).to_string());
                format!("{}.{port_name}", self.names.resolve(instance.name))
            }
            VarName::Flat(slot) => format!("#{slot}"),
        }
    }

    pub(crate) fn bit_display(&self, bit: BitRef) -> String {
        let (name, width, index) = match bit {
            BitRef::Z => return "z".to_string(),
            BitRef::Wire(w, i) => (VarName::Wire(w), self.wires[w.index()].width, i),
            BitRef::Port(inst, port, i) => (
                VarName::PortInst { inst, port },
                self.instances[inst.index()].ports[port.index()].width,
                i,
            ),
        };
        let base = self.var_display(name);
        if width == 1 {
            base
        } else {
            format!("{base}[{index}]")
        }
    }

    fn check_lhs(&self, lhs: &Lhs) -> Result<(), ModelError> {
        for range in lhs.ranges() {
            let LhAtom::Var { name, rsh } = range.atom else {
                continue;
            };
            if matches!(name, VarName::Flat(_)) {
                return Err(self.error(format!("flat reference {} in a module", self.var_display(name))));
            }
            let width = self
                .var_width(name)
                .ok_or_else(|| self.error(format!("unknown signal {}", self.var_display(name))))?;
            if rsh.checked_add(range.width).map_or(true, |end| end > width) {
                return Err(self.error(format!(
                    "range of {} bits at {rsh} exceeds {} of width {width}",
                    range.width,
                    self.var_display(name)
                )));
            }
        }
        Ok(())
    }

    fn check_drivers(&self) -> Result<Arena<AssignId, Driver>, ModelError> {
        let mut drivers = Arena::new();
        for assign in self.raw.assigns.values() {
            let strength = Strength::from_raw(assign.strength)
                .ok_or_else(|| self.error(format!("illegal strength {}", assign.strength)))?;
            self.check_lhs(&assign.lhs)?;
            if !self.raw.exprs.contains(assign.rhs) {
                return Err(self.error(format!("assignment reads missing expression {}", assign.rhs)));
            }
            for var in self.raw.exprs.vars(assign.rhs) {
                if self.var_width(var.name).is_none() {
                    return Err(self.error(format!(
                        "expression reads unknown signal {}",
                        self.var_display(var.name)
                    )));
                }
            }
            drivers.alloc(Driver {
                lhs: assign.lhs.clone(),
                expr: assign.rhs,
                strength,
            });
        }
        Ok(drivers)
    }

    fn assign_bits(&mut self) -> Result<(), ModelError> {
        let raw = self.raw;
        for (aid, assign) in raw.assigns.iter() {
            for (pos, bit) in assign.lhs.bits().into_iter().enumerate() {
                let Some(bit) = BitRef::from_lh(bit) else {
                    continue;
                };
                if let BitRef::Port(inst, port, i) = bit {
                    if self.port(inst, port).is_output(i) {
                        return Err(self.error(format!(
                            "assignment to output bit {}",
                            self.bit_display(bit)
                        )));
                    }
                }
                let source = Source::Driver {
                    id: aid,
                    lsb: pos as u32,
                };
                if !matches!(bit, BitRef::Z) && !self.drive(bit, source) {
                    return Err(self.error(format!("double assignment to {}", self.bit_display(bit))));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn port(&self, inst: InstanceId, port: WireId) -> &PortInst {
        &self.instances[inst.index()].ports[port.index()]
    }

    /// Marks `bit` driven by `source`; `false` if it already was.
    pub(crate) fn drive(&mut self, bit: BitRef, source: Source) -> bool {
        match bit {
            BitRef::Z => false,
            BitRef::Wire(w, i) => {
                let wire = &mut self.wires[w.index()];
                if wire.assigned.contains(i) {
                    return false;
                }
                wire.assigned = &wire.assigned | &Mask::bit(i);
                self.wire_bits[w.index()][i as usize] = Some(source);
                true
            }
            BitRef::Port(inst, port, i) => {
                let p = &mut self.instances[inst.index()].ports[port.index()];
                if p.assigned.contains(i) || p.outputs.contains(i) {
                    return false;
                }
                p.assigned = &p.assigned | &Mask::bit(i);
                self.port_bits[inst.index()][port.index()][i as usize] = Some(source);
                true
            }
        }
    }
}

/// Groups per-bit sources into maximal runs of consecutive source bits.
fn group_runs(bits: &[Option<Source>]) -> DriverMap {
    let mut runs = DriverMap::new();
    let mut current: Option<(u32, WireDriver)> = None;
    for (i, src) in bits.iter().enumerate() {
        let i = i as u32;
        if let (Some(s), Some((lsb, run))) = (src, current.as_mut()) {
            if *lsb + run.width == i && run.source.offset(run.width) == *s {
                run.width += 1;
                continue;
            }
        }
        if let Some((lsb, run)) = current.take() {
            runs.insert(lsb, run);
        }
        current = src.map(|source| (i, WireDriver { width: 1, source }));
    }
    if let Some((lsb, run)) = current {
        runs.insert(lsb, run);
    }
    runs
}
