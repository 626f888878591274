//! Flat slot numbering.
//!
//! A module instance placed at `offset` owns slots `offset..offset +
//! total_wires`: first its own wires in order, then the subtree of each
//! instance in index order.

use serde::{Deserialize, Serialize};
use strata_common::{Interner, InternalError, StrataResult};
use strata_ir::{InstanceId, ModuleId, VarName, WireId};
use strata_model::Model;

/// Per-module instance offsets, relative to the module's own offset.
#[derive(Debug, Clone)]
pub struct Layout {
    inst_offsets: Vec<Vec<u32>>,
}

impl Layout {
    /// Computes the layout of every module of `model`.
    pub fn new(model: &Model) -> Layout {
        let inst_offsets = model
            .modules
            .values()
            .map(|m| {
                let mut next = m.wires.len() as u32;
                m.instances
                    .values()
                    .map(|inst| {
                        let start = next;
                        next += model.module(inst.module).total_wires;
                        start
                    })
                    .collect()
            })
            .collect();
        Layout { inst_offsets }
    }

    /// Where the subtree of `inst` starts, relative to `module`'s offset.
    pub fn instance_offset(&self, module: ModuleId, inst: InstanceId) -> u32 {
        self.inst_offsets[module.index()][inst.index()]
    }

    /// The flat slot of a local variable of `module` placed at `offset`.
    pub fn slot(&self, model: &Model, module: ModuleId, offset: u32, name: VarName) -> Option<u32> {
        let m = model.module(module);
        match name {
            VarName::Wire(w) => m.wires.contains(w).then(|| offset + w.as_raw()),
            VarName::PortInst { inst, port } => {
                m.instances.try_get(inst)?.port(port)?;
                Some(offset + self.instance_offset(module, inst) + port.as_raw())
            }
            VarName::Flat(_) => None,
        }
    }
}

/// One module instance in the flattened hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// The instantiated module.
    pub module: ModuleId,
    /// Its first slot.
    pub offset: u32,
    /// The enclosing scope; `None` for the top.
    pub parent: Option<u32>,
    /// The instance in the parent's module; `None` for the top.
    pub instance: Option<InstanceId>,
}

/// One flat slot: a wire of some scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSlot {
    /// The owning scope.
    pub scope: u32,
    /// The wire within the scope's module.
    pub wire: WireId,
    /// Number of bits.
    pub width: u32,
}

/// Every scope and slot below a top module, scopes in pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    /// Scopes, parents before children.
    pub scopes: Vec<Scope>,
    /// Slots, indexed by slot number.
    pub slots: Vec<FlatSlot>,
}

impl Hierarchy {
    /// Enumerates the hierarchy below the model's top module.
    pub fn build(model: &Model, layout: &Layout) -> StrataResult<Hierarchy> {
        let total = model.top_module().total_wires as usize;
        let mut slots: Vec<Option<FlatSlot>> = vec![None; total];
        let mut scopes = Vec::new();
        let mut stack = vec![(model.top, 0u32, None, None)];
        while let Some((module, offset, parent, instance)) = stack.pop() {
            let index = scopes.len() as u32;
            scopes.push(Scope {
                module,
                offset,
                parent,
                instance,
            });
            let m = model.module(module);
            for (wire, w) in m.wires.iter() {
                let slot = slots
                    .get_mut((offset + wire.as_raw()) as usize)
                    .ok_or_else(|| InternalError::new(format!("slot of {wire} out of range")))?;
                *slot = Some(FlatSlot {
                    scope: index,
                    wire,
                    width: w.width,
                });
            }
            for (iid, inst) in m.instances.iter().rev() {
                let child = offset + layout.instance_offset(module, iid);
                stack.push((inst.module, child, Some(index), Some(iid)));
            }
        }
        let slots = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| InternalError::new("flat slots left unassigned"))?;
        Ok(Hierarchy { scopes, slots })
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Dotted instance path of a scope; empty for the top.
    pub fn scope_path(&self, names: &Interner, model: &Model, scope: u32) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(scope);
        while let Some(s) = cur {
            let sc = &self.scopes[s as usize];
            if let (Some(parent), Some(inst)) = (sc.parent, sc.instance) {
                let pm = model.module(self.scopes[parent as usize].module);
                parts.push(names.resolve(pm.instances[inst].name).to_string());
            }
            cur = sc.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Hierarchical name of a slot, such as `u0.u1.a`.
    pub fn slot_name(&self, names: &Interner, model: &Model, slot: u32) -> String {
        let Some(fs) = self.slots.get(slot as usize) else {
            return format!("#{slot}");
        };
        let module = model.module(self.scopes[fs.scope as usize].module);
        let wire = names.resolve(module.wires[fs.wire].name);
        let path = self.scope_path(names, model, fs.scope);
        if path.is_empty() {
            wire.to_string()
        } else {
            format!("{path}.{wire}")
        }
    }
}
