//! The design-wide alias table.
//!
//! Each flat slot maps to an Lhs of root bits (bits that are nobody's sink)
//! and `Z`. The table can be built top-down in one walk of the hierarchy, or
//! bottom-up from memoized per-module tables; both must agree.

use crate::layout::{Hierarchy, Layout};
use serde::{Deserialize, Serialize};
use strata_common::{InternalError, StrataResult};
use strata_ir::{LhBit, Lhs, ModuleId, VarName};
use strata_model::{Model, Source, WireDriver};
use tracing::debug;

/// Canonical form of every flat slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: Vec<Lhs>,
}

impl AliasTable {
    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The canonical form of `slot`.
    pub fn get(&self, slot: u32) -> Option<&Lhs> {
        self.entries.get(slot as usize)
    }

    /// All entries, indexed by slot.
    pub fn entries(&self) -> &[Lhs] {
        &self.entries
    }

    /// Whether bit `bit` of `slot` is a root.
    pub fn is_root(&self, slot: u32, bit: u32) -> bool {
        self.get(slot)
            .map(|lhs| lhs.subrange(bit, 1).bits() == [LhBit::Var(VarName::Flat(slot), bit)])
            .unwrap_or(false)
    }

    /// Maps a local Lhs of `module`, placed at `offset`, to canonical flat bits.
    pub fn flatten_lhs(
        &self,
        model: &Model,
        layout: &Layout,
        module: ModuleId,
        offset: u32,
        lhs: &Lhs,
    ) -> StrataResult<Lhs> {
        let mut missing = None;
        let flat = lhs.map_names(|name| match layout.slot(model, module, offset, name) {
            Some(slot) => VarName::Flat(slot),
            None => {
                missing = Some(name);
                name
            }
        });
        if let Some(name) = missing {
            return Err(InternalError::new(format!("{name} has no flat slot")));
        }
        Ok(flat.expand(|name| match name {
            VarName::Flat(slot) => self.entries.get(slot as usize).cloned(),
            _ => None,
        }))
    }
}

/// Per-bit working form of an alias table.
struct BitTable {
    bits: Vec<Vec<LhBit>>,
}

impl BitTable {
    fn identity(widths: impl IntoIterator<Item = u32>) -> Self {
        let bits = widths
            .into_iter()
            .enumerate()
            .map(|(slot, width)| {
                (0..width)
                    .map(|b| LhBit::Var(VarName::Flat(slot as u32), b))
                    .collect()
            })
            .collect();
        BitTable { bits }
    }

    /// Appends a child table whose slots start at `offset`.
    fn append_shifted(&mut self, child: &BitTable, offset: u32) {
        for slot in &child.bits {
            self.bits.push(
                slot.iter()
                    .map(|b| match *b {
                        LhBit::Var(VarName::Flat(s), i) => LhBit::Var(VarName::Flat(s + offset), i),
                        other => other,
                    })
                    .collect(),
            );
        }
    }

    /// Points every alias sink of `module` at its source.
    fn apply_sinks(
        &mut self,
        model: &Model,
        layout: &Layout,
        module: ModuleId,
        offset: u32,
    ) -> StrataResult<()> {
        let m = model.module(module);
        let mut targets: Vec<(u32, u32, WireDriver)> = Vec::new();
        for (wire, w) in m.wires.iter() {
            let slot = offset + wire.as_raw();
            targets.extend(w.drivers.iter().map(|(&lsb, d)| (slot, lsb, *d)));
        }
        for (iid, inst) in m.instances.iter() {
            for port in &inst.ports {
                let slot = offset + layout.instance_offset(module, iid) + port.port.as_raw();
                targets.extend(port.drivers.iter().map(|(&lsb, d)| (slot, lsb, *d)));
            }
        }

        for (slot, lsb, driver) in targets {
            let source_slot = match driver.source {
                Source::Driver { .. } => continue,
                Source::Z => None,
                source => {
                    let name = source.var_name().ok_or_else(|| {
                        InternalError::new(format!("alias source {source:?} has no name"))
                    })?;
                    let s = layout.slot(model, module, offset, name).ok_or_else(|| {
                        InternalError::new(format!("alias source {name} has no flat slot"))
                    })?;
                    Some(s)
                }
            };
            for k in 0..driver.width {
                let bit = match source_slot {
                    Some(s) => LhBit::Var(VarName::Flat(s), driver.source.lsb() + k),
                    None => LhBit::Z,
                };
                let target = self
                    .bits
                    .get_mut(slot as usize)
                    .and_then(|bits| bits.get_mut((lsb + k) as usize))
                    .ok_or_else(|| InternalError::new(format!("alias sink #{slot} out of range")))?;
                *target = bit;
            }
        }
        Ok(())
    }

    /// Follows every chain of sinks to its root.
    fn normalize(&mut self) -> StrataResult<()> {
        const OPEN: u8 = 0;
        const ACTIVE: u8 = 1;
        const DONE: u8 = 2;
        let mut state: Vec<Vec<u8>> = self.bits.iter().map(|b| vec![OPEN; b.len()]).collect();

        for slot in 0..self.bits.len() {
            for bit in 0..self.bits[slot].len() {
                let mut path = Vec::new();
                let mut cur = (slot, bit);
                let result = loop {
                    match state[cur.0][cur.1] {
                        DONE => break self.bits[cur.0][cur.1],
                        ACTIVE => {
                            return Err(InternalError::new(format!(
                                "alias cycle through #{}[{}]",
                                cur.0, cur.1
                            )))
                        }
                        _ => {}
                    }
                    state[cur.0][cur.1] = ACTIVE;
                    path.push(cur);
                    match self.bits[cur.0][cur.1] {
                        LhBit::Z => break LhBit::Z,
                        LhBit::Var(VarName::Flat(s), i) => {
                            let next = (s as usize, i as usize);
                            if next == cur {
                                break self.bits[cur.0][cur.1];
                            }
                            if self.bits.get(next.0).map_or(true, |b| next.1 >= b.len()) {
                                return Err(InternalError::new(format!(
                                    "alias of #{}[{}] points outside the table",
                                    cur.0, cur.1
                                )));
                            }
                            cur = next;
                        }
                        LhBit::Var(name, _) => {
                            return Err(InternalError::new(format!("non-flat name {name} in alias table")))
                        }
                    }
                };
                for (s, b) in path {
                    self.bits[s][b] = result;
                    state[s][b] = DONE;
                }
            }
        }
        Ok(())
    }

    fn into_table(self) -> AliasTable {
        AliasTable {
            entries: self.bits.iter().map(|b| Lhs::from_bits(b)).collect(),
        }
    }
}

/// Builds the alias table in one top-down walk of the hierarchy.
pub fn make_aliases(model: &Model, layout: &Layout, hierarchy: &Hierarchy) -> StrataResult<AliasTable> {
    let mut table = BitTable::identity(hierarchy.slots.iter().map(|s| s.width));
    for scope in &hierarchy.scopes {
        table.apply_sinks(model, layout, scope.module, scope.offset)?;
    }
    table.normalize()?;
    debug!(slots = table.bits.len(), "alias table built top-down");
    Ok(table.into_table())
}

/// Builds the alias table from per-module tables, leaves first.
///
/// Each module's table covers its own wires followed by the tables of its
/// instances, so the table of the top module is the design's table.
pub fn make_aliases_bottom_up(model: &Model, layout: &Layout) -> StrataResult<AliasTable> {
    let mut memo: Vec<Option<BitTable>> = (0..model.modules.len()).map(|_| None).collect();
    for &id in &model.order {
        let m = model.module(id);
        let mut table = BitTable::identity(m.wires.values().map(|w| w.width));
        for inst in m.instances.values() {
            let offset = table.bits.len() as u32;
            let child = memo[inst.module.index()]
                .as_ref()
                .ok_or_else(|| InternalError::new(format!("module {} built out of order", inst.module)))?;
            table.append_shifted(child, offset);
        }
        table.apply_sinks(model, layout, id, 0)?;
        table.normalize()?;
        memo[id.index()] = Some(table);
    }
    let top = memo
        .get_mut(model.top.index())
        .and_then(Option::take)
        .ok_or_else(|| InternalError::new("top module has no alias table"))?;
    debug!(slots = top.bits.len(), "alias table built bottom-up");
    Ok(top.into_table())
}

/// Checks that two alias tables agree slot by slot.
pub fn verify_aliases(top_down: &AliasTable, bottom_up: &AliasTable) -> StrataResult<()> {
    if top_down.len() != bottom_up.len() {
        return Err(InternalError::new(format!(
            "alias tables have {} and {} slots",
            top_down.len(),
            bottom_up.len()
        )));
    }
    let mismatch = top_down
        .entries
        .iter()
        .zip(&bottom_up.entries)
        .position(|(a, b)| a != b);
    match mismatch {
        Some(slot) => Err(InternalError::new(format!(
            "alias tables differ at #{slot}: {} vs {}",
            top_down.entries[slot], bottom_up.entries[slot]
        ))),
        None => Ok(()),
    }
}
