//! Bit-level alias resolution.
//!
//! Every alias is split into bit pairs. A pair with one driven side makes
//! the other side its sink. Pairs with no driven side wait for later
//! progress; when nothing moves, an undriven export bit is promoted to an
//! input and resolution resumes.

use crate::build::ModuleBuilder;
use crate::error::ModelError;
use crate::types::Source;
use strata_ir::{InstanceId, LhBit, VarName, WireId};
use tracing::trace;

/// One bit of a local wire or port-instance, or a `Z` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BitRef {
    Wire(WireId, u32),
    Port(InstanceId, WireId, u32),
    Z,
}

impl BitRef {
    /// Converts an Lhs bit; flat references have no local bit.
    pub(crate) fn from_lh(bit: LhBit) -> Option<BitRef> {
        match bit {
            LhBit::Z => Some(BitRef::Z),
            LhBit::Var(VarName::Wire(w), i) => Some(BitRef::Wire(w, i)),
            LhBit::Var(VarName::PortInst { inst, port }, i) => Some(BitRef::Port(inst, port, i)),
            LhBit::Var(VarName::Flat(_), _) => None,
        }
    }

    fn as_source(self) -> Source {
        match self {
            BitRef::Wire(wire, lsb) => Source::Wire { wire, lsb },
            BitRef::Port(inst, port, lsb) => Source::PortInst { inst, port, lsb },
            BitRef::Z => Source::Z,
        }
    }
}

impl ModuleBuilder<'_> {
    fn is_driven(&self, bit: BitRef) -> bool {
        match bit {
            BitRef::Z => true,
            BitRef::Wire(w, i) => {
                self.wires[w.index()].assigned.contains(i) || self.promoted[w.index()].contains(i)
            }
            BitRef::Port(inst, port, i) => {
                let p = self.port(inst, port);
                p.outputs.contains(i) || p.assigned.contains(i)
            }
        }
    }

    fn is_promotable(&self, bit: BitRef) -> bool {
        match bit {
            BitRef::Wire(w, _) => self.wires[w.index()].export && !self.is_driven(bit),
            _ => false,
        }
    }

    fn promote(&mut self, bit: BitRef) {
        if let BitRef::Wire(w, i) = bit {
            let mask = &mut self.promoted[w.index()];
            *mask = &*mask | &strata_common::Mask::bit(i);
        }
    }

    /// Resolves every alias of the module into sinks and sources.
    pub(crate) fn resolve_aliases(&mut self) -> Result<(), ModelError> {
        let mut pending: Vec<(BitRef, BitRef)> = Vec::new();
        for alias in &self.raw.aliases {
            for (l, r) in alias.lhs.bits().into_iter().zip(alias.rhs.bits()) {
                let (Some(l), Some(r)) = (BitRef::from_lh(l), BitRef::from_lh(r)) else {
                    continue;
                };
                if l != r && !(l == BitRef::Z && r == BitRef::Z) {
                    pending.push((l, r));
                }
            }
        }

        let mut rounds = 0usize;
        while !pending.is_empty() {
            rounds += 1;
            let mut waiting = Vec::new();
            let mut progress = false;
            for (l, r) in std::mem::take(&mut pending) {
                match (self.is_driven(l), self.is_driven(r)) {
                    (true, true) => {
                        let signal = if l == BitRef::Z { r } else { l };
                        return Err(ModelError::Overlap {
                            module: self.module_name.to_string(),
                            signal: self.bit_display(signal),
                        });
                    }
                    (true, false) => {
                        self.drive(r, l.as_source());
                        progress = true;
                    }
                    (false, true) => {
                        self.drive(l, r.as_source());
                        progress = true;
                    }
                    (false, false) => waiting.push((l, r)),
                }
            }
            pending = waiting;
            if progress || pending.is_empty() {
                continue;
            }

            let promotable = pending.iter().find_map(|&(l, r)| {
                if self.is_promotable(r) {
                    Some(r)
                } else if self.is_promotable(l) {
                    Some(l)
                } else {
                    None
                }
            });
            match promotable {
                Some(bit) => {
                    trace!(
                        module = self.module_name,
                        bit = %self.bit_display(bit),
                        "promoting export bit to input"
                    );
                    self.promote(bit);
                }
                None => {
                    return Err(ModelError::DanglingAlias {
                        module: self.module_name.to_string(),
                        signal: self.bit_display(pending[0].0),
                    })
                }
            }
        }
        trace!(module = self.module_name, rounds, "aliases resolved");
        Ok(())
    }
}
