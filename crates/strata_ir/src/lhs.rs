//! Assignment targets: lists of variable bit-ranges.
//!
//! An [`Lhs`] names a sequence of bits, least significant first, as a list
//! of [`Lhrange`]s. Each range is either a slice of a variable or a run of
//! `Z` (no storage). Lhs values appear as assignment targets, as both sides
//! of aliases, and as the canonical form of each flattened wire.

use crate::expr::{ExprManager, Func, VarName, Variable};
use crate::ids::ExprId;
use serde::{Deserialize, Serialize};
use std::fmt;
use strata_common::Value;

/// The storage a range refers to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum LhAtom {
    /// No storage; reads as `Z`.
    Z,
    /// Bits `rsh..` of a variable.
    Var {
        /// The variable.
        name: VarName,
        /// Index of the first referenced bit.
        rsh: u32,
    },
}

/// A run of `width` bits of an atom.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Lhrange {
    /// Number of bits.
    pub width: u32,
    /// What the bits are.
    pub atom: LhAtom,
}

impl Lhrange {
    /// `width` bits of `name` starting at bit `rsh`.
    pub fn var(name: VarName, rsh: u32, width: u32) -> Self {
        Self {
            width,
            atom: LhAtom::Var { name, rsh },
        }
    }

    /// `width` bits of `Z`.
    pub fn z(width: u32) -> Self {
        Self {
            width,
            atom: LhAtom::Z,
        }
    }

    /// The sub-range of `width` bits starting `offset` bits into this range.
    pub fn slice(&self, offset: u32, width: u32) -> Lhrange {
        let atom = match self.atom {
            LhAtom::Z => LhAtom::Z,
            LhAtom::Var { name, rsh } => LhAtom::Var {
                name,
                rsh: rsh + offset,
            },
        };
        Lhrange { width, atom }
    }

    /// Returns `true` if `next` continues this range bit for bit.
    fn continues_into(&self, next: &Lhrange) -> bool {
        match (self.atom, next.atom) {
            (LhAtom::Z, LhAtom::Z) => true,
            (LhAtom::Var { name: a, rsh: ra }, LhAtom::Var { name: b, rsh: rb }) => {
                a == b && ra + self.width == rb
            }
            _ => false,
        }
    }
}

/// One bit of an [`Lhs`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LhBit {
    /// A `Z` bit.
    Z,
    /// Bit `index` of a variable.
    Var(VarName, u32),
}

/// A list of bit-ranges, least significant first.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lhs(pub Vec<Lhrange>);

impl Lhs {
    /// The empty Lhs.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Bits `0..width` of `name`.
    pub fn var(name: VarName, width: u32) -> Self {
        Self(vec![Lhrange::var(name, 0, width)]).norm()
    }

    /// `width` bits of `Z`.
    pub fn z(width: u32) -> Self {
        Self(vec![Lhrange::z(width)]).norm()
    }

    /// Total number of bits.
    pub fn width(&self) -> u32 {
        self.0.iter().map(|r| r.width).sum()
    }

    /// Returns `true` if the Lhs has no bits.
    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// The ranges, least significant first.
    pub fn ranges(&self) -> &[Lhrange] {
        &self.0
    }

    /// Drops empty ranges and merges ranges that continue each other.
    pub fn norm(&self) -> Lhs {
        let mut out: Vec<Lhrange> = Vec::with_capacity(self.0.len());
        for r in self.0.iter().filter(|r| r.width > 0) {
            match out.last_mut() {
                Some(last) if last.continues_into(r) => last.width += r.width,
                _ => out.push(*r),
            }
        }
        Lhs(out)
    }

    /// Returns `true` if the Lhs is already in normal form.
    pub fn is_norm(&self) -> bool {
        self.norm() == *self
    }

    /// Bits `lsb..lsb + width`, clipped to the width of the Lhs.
    pub fn subrange(&self, lsb: u32, width: u32) -> Lhs {
        let end = lsb + width;
        let mut out = Vec::new();
        let mut pos = 0u32;
        for r in &self.0 {
            let (start, stop) = (pos, pos + r.width);
            pos = stop;
            let lo = start.max(lsb);
            let hi = stop.min(end);
            if lo < hi {
                out.push(r.slice(lo - start, hi - lo));
            }
            if pos >= end {
                break;
            }
        }
        Lhs(out).norm()
    }

    /// This Lhs followed by `high` in the more significant bits.
    pub fn concat(&self, high: &Lhs) -> Lhs {
        let mut ranges = self.0.clone();
        ranges.extend_from_slice(&high.0);
        Lhs(ranges).norm()
    }

    /// The individual bits, least significant first.
    pub fn bits(&self) -> Vec<LhBit> {
        let mut bits = Vec::with_capacity(self.width() as usize);
        for r in &self.0 {
            for i in 0..r.width {
                bits.push(match r.atom {
                    LhAtom::Z => LhBit::Z,
                    LhAtom::Var { name, rsh } => LhBit::Var(name, rsh + i),
                });
            }
        }
        bits
    }

    /// Rebuilds a normalized Lhs from individual bits.
    pub fn from_bits(bits: &[LhBit]) -> Lhs {
        let ranges = bits
            .iter()
            .map(|b| match *b {
                LhBit::Z => Lhrange::z(1),
                LhBit::Var(name, i) => Lhrange::var(name, i, 1),
            })
            .collect();
        Lhs(ranges).norm()
    }

    /// Renames every variable through `f`, keeping the bit offsets.
    pub fn map_names(&self, mut f: impl FnMut(VarName) -> VarName) -> Lhs {
        let ranges = self
            .0
            .iter()
            .map(|r| match r.atom {
                LhAtom::Z => *r,
                LhAtom::Var { name, rsh } => Lhrange::var(f(name), rsh, r.width),
            })
            .collect();
        Lhs(ranges).norm()
    }

    /// Replaces each variable range by the matching bits of another Lhs.
    ///
    /// `f` returns the full Lhs standing for a variable, or `None` to keep the
    /// variable itself.
    pub fn expand(&self, mut f: impl FnMut(VarName) -> Option<Lhs>) -> Lhs {
        let mut ranges = Vec::with_capacity(self.0.len());
        for r in &self.0 {
            match r.atom {
                LhAtom::Var { name, rsh } => match f(name) {
                    Some(full) => ranges.extend_from_slice(&full.subrange(rsh, r.width).0),
                    None => ranges.push(*r),
                },
                LhAtom::Z => ranges.push(*r),
            }
        }
        Lhs(ranges).norm()
    }

    /// Renders the Lhs as an expression: the concatenation of its ranges,
    /// `Z` above the top bit.
    pub fn to_expr(&self, m: &mut ExprManager) -> ExprId {
        self.to_expr_as(m, 0, false)
    }

    /// Like [`to_expr`](Self::to_expr), reading every variable with the
    /// given delay and nonblocking flag.
    pub fn to_expr_as(&self, m: &mut ExprManager, delay: u32, nonblocking: bool) -> ExprId {
        let mut acc = m.constant(Value::z());
        for r in self.0.iter().rev() {
            let part = match r.atom {
                LhAtom::Z => m.constant(Value::z()),
                LhAtom::Var { name, rsh } => {
                    let v = m.var(Variable {
                        name,
                        delay,
                        nonblocking,
                    });
                    if rsh == 0 {
                        v
                    } else {
                        let amount = m.constant(Value::from_u64(u64::from(rsh)));
                        m.call_folded(Func::Rsh, vec![amount, v])
                    }
                }
            };
            let width = m.constant(Value::from_u64(u64::from(r.width)));
            acc = m.call_folded(Func::Concat, vec![width, part, acc]);
        }
        acc
    }
}

impl fmt::Display for Lhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, r) in self.0.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match r.atom {
                LhAtom::Z => write!(f, "{}'z", r.width)?,
                LhAtom::Var { name, rsh } => {
                    write!(f, "{name}[{}:{rsh}]", rsh + r.width - 1)?
                }
            }
        }
        f.write_str("}")
    }
}
