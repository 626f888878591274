//! The closed set of expression functions.
//!
//! Each [`Func`] knows its textual name, its arity, how to fold constant
//! arguments, and how an output care mask translates into care masks for its
//! arguments. Argument conventions follow the SV-style primitives:
//!
//! | function | arguments |
//! |----------|-----------|
//! | `zerox`, `signx` | `width, x` |
//! | `concat` | `width, low, high` |
//! | `rsh`, `lsh` | `amount, x` |
//! | `bitsel` | `index, x` |
//! | `partsel` | `lsb, width, x` |
//! | `partinst` | `lsb, width, old, new` |
//! | `?`, `?*`, `bit?` | `test, then, else` |

use crate::ids::ExprId;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use strata_common::{Mask, Value};

/// Widths and shift amounts beyond this are not folded.
const MAX_FOLD_WIDTH: u32 = 1 << 16;

/// A primitive expression function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Func {
    /// Identity.
    Id,
    /// Bitwise NOT.
    BitNot,
    /// Bits that may be 1.
    Onp,
    /// Bits that may be 0.
    Offp,
    /// Bitwise AND.
    BitAnd,
    /// Bitwise OR.
    BitOr,
    /// Bitwise XOR.
    BitXor,
    /// Wired resolution of two drivers.
    Res,
    /// Wired-AND resolution.
    ResAnd,
    /// Wired-OR resolution.
    ResOr,
    /// First argument unless it is Z.
    Override,
    /// Reduction AND.
    UAnd,
    /// Reduction OR.
    UOr,
    /// Reduction XOR.
    UXor,
    /// Zero extension.
    ZeroX,
    /// Sign extension.
    SignX,
    /// Concatenation.
    Concat,
    /// Right shift.
    Rsh,
    /// Left shift.
    Lsh,
    /// Single-bit select.
    BitSel,
    /// Part select.
    PartSel,
    /// Part install.
    PartInst,
    /// `?` conditional.
    Ite,
    /// `?*` conditional.
    IteStar,
    /// Per-bit multiplexer.
    BitMux,
    /// Addition.
    Plus,
    /// Subtraction.
    Minus,
    /// Negation.
    UMinus,
    /// Multiplication.
    Times,
    /// Division.
    Quotient,
    /// Remainder.
    Remainder,
    /// X detection.
    XDet,
    /// Population count.
    CountOnes,
    /// Exactly one bit set.
    OneHot,
    /// At most one bit set.
    OneHot0,
    /// Less-than.
    Lt,
    /// Equality.
    Eq,
    /// Case equality.
    EqEqEq,
    /// Wildcard equality.
    WildEq,
    /// Ceiling log2.
    Clog2,
    /// Exponentiation.
    Pow,
}

/// The result of simplifying a call whose arguments are partially constant.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Simplified {
    /// The call is this constant.
    Const(Value),
    /// The call is its argument at this position.
    Arg(usize),
}

impl Func {
    /// Every function, in declaration order.
    pub const ALL: [Func; 41] = [
        Func::Id,
        Func::BitNot,
        Func::Onp,
        Func::Offp,
        Func::BitAnd,
        Func::BitOr,
        Func::BitXor,
        Func::Res,
        Func::ResAnd,
        Func::ResOr,
        Func::Override,
        Func::UAnd,
        Func::UOr,
        Func::UXor,
        Func::ZeroX,
        Func::SignX,
        Func::Concat,
        Func::Rsh,
        Func::Lsh,
        Func::BitSel,
        Func::PartSel,
        Func::PartInst,
        Func::Ite,
        Func::IteStar,
        Func::BitMux,
        Func::Plus,
        Func::Minus,
        Func::UMinus,
        Func::Times,
        Func::Quotient,
        Func::Remainder,
        Func::XDet,
        Func::CountOnes,
        Func::OneHot,
        Func::OneHot0,
        Func::Lt,
        Func::Eq,
        Func::EqEqEq,
        Func::WildEq,
        Func::Clog2,
        Func::Pow,
    ];

    /// The stable textual name.
    pub fn name(self) -> &'static str {
        match self {
            Func::Id => "id",
            Func::BitNot => "bitnot",
            Func::Onp => "onp",
            Func::Offp => "offp",
            Func::BitAnd => "bitand",
            Func::BitOr => "bitor",
            Func::BitXor => "bitxor",
            Func::Res => "res",
            Func::ResAnd => "resand",
            Func::ResOr => "resor",
            Func::Override => "override",
            Func::UAnd => "uand",
            Func::UOr => "uor",
            Func::UXor => "uxor",
            Func::ZeroX => "zerox",
            Func::SignX => "signx",
            Func::Concat => "concat",
            Func::Rsh => "rsh",
            Func::Lsh => "lsh",
            Func::BitSel => "bitsel",
            Func::PartSel => "partsel",
            Func::PartInst => "partinst",
            Func::Ite => "?",
            Func::IteStar => "?*",
            Func::BitMux => "bit?",
            Func::Plus => "+",
            Func::Minus => "b-",
            Func::UMinus => "u-",
            Func::Times => "*",
            Func::Quotient => "/",
            Func::Remainder => "%",
            Func::XDet => "xdet",
            Func::CountOnes => "countones",
            Func::OneHot => "onehot",
            Func::OneHot0 => "onehot0",
            Func::Lt => "<",
            Func::Eq => "==",
            Func::EqEqEq => "===",
            Func::WildEq => "==?",
            Func::Clog2 => "clog2",
            Func::Pow => "**",
        }
    }

    /// Looks a function up by its textual name.
    pub fn from_name(name: &str) -> Option<Func> {
        Func::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// The number of arguments.
    pub fn arity(self) -> usize {
        match self {
            Func::Id
            | Func::BitNot
            | Func::Onp
            | Func::Offp
            | Func::UAnd
            | Func::UOr
            | Func::UXor
            | Func::UMinus
            | Func::XDet
            | Func::CountOnes
            | Func::OneHot
            | Func::OneHot0
            | Func::Clog2 => 1,
            Func::Concat | Func::PartSel | Func::Ite | Func::IteStar | Func::BitMux => 3,
            Func::PartInst => 4,
            _ => 2,
        }
    }

    /// Evaluates the function on constant arguments.
    ///
    /// `args.len()` must equal [`arity`](Self::arity).
    pub fn eval(self, args: &[Value]) -> Value {
        debug_assert_eq!(args.len(), self.arity());
        let amount = |i: usize| args[i].as_u32().filter(|&n| n <= MAX_FOLD_WIDTH);
        match self {
            Func::Id => args[0].clone(),
            Func::BitNot => args[0].bitnot(),
            Func::Onp => args[0].onp(),
            Func::Offp => args[0].offp(),
            Func::BitAnd => args[0].bitand(&args[1]),
            Func::BitOr => args[0].bitor(&args[1]),
            Func::BitXor => args[0].bitxor(&args[1]),
            Func::Res => args[0].res(&args[1]),
            Func::ResAnd => args[0].resand(&args[1]),
            Func::ResOr => args[0].resor(&args[1]),
            Func::Override => args[0].override_with(&args[1]),
            Func::UAnd => args[0].uand(),
            Func::UOr => args[0].uor(),
            Func::UXor => args[0].uxor(),
            Func::ZeroX => amount(0).map_or_else(Value::x, |w| args[1].zero_ext(w)),
            Func::SignX => amount(0).map_or_else(Value::x, |w| args[1].sign_ext(w)),
            Func::Concat => {
                amount(0).map_or_else(Value::x, |w| Value::concat(w, &args[1], &args[2]))
            }
            Func::Rsh => amount(0).map_or_else(Value::x, |n| args[1].rsh(n)),
            Func::Lsh => amount(0).map_or_else(Value::x, |n| args[1].lsh(n)),
            Func::BitSel => amount(0).map_or_else(Value::x, |i| args[1].rsh(i).zero_ext(1)),
            Func::PartSel => match (amount(0), amount(1)) {
                (Some(lsb), Some(w)) => args[2].rsh(lsb).zero_ext(w),
                _ => Value::x(),
            },
            Func::PartInst => match (amount(0), amount(1)) {
                (Some(lsb), Some(w)) => args[2].part_install(lsb, w, &args[3]),
                _ => Value::x(),
            },
            Func::Ite => Value::ite(&args[0], &args[1], &args[2]),
            Func::IteStar => Value::ite_star(&args[0], &args[1], &args[2]),
            Func::BitMux => Value::bitmux(&args[0], &args[1], &args[2]),
            Func::Plus => args[0].plus(&args[1]),
            Func::Minus => args[0].minus(&args[1]),
            Func::UMinus => args[0].uminus(),
            Func::Times => args[0].times(&args[1]),
            Func::Quotient => args[0].quotient(&args[1]),
            Func::Remainder => args[0].remainder(&args[1]),
            Func::XDet => args[0].xdet(),
            Func::CountOnes => args[0].countones(),
            Func::OneHot => args[0].onehot(),
            Func::OneHot0 => args[0].onehot0(),
            Func::Lt => args[0].lt(&args[1]),
            Func::Eq => args[0].equal(&args[1]),
            Func::EqEqEq => args[0].eqeq_eq(&args[1]),
            Func::WildEq => args[0].wildeq(&args[1]),
            Func::Clog2 => args[0].clog2(),
            Func::Pow => args[0].pow(&args[1]),
        }
    }

    /// Simplifies a call given which arguments are constant.
    ///
    /// Returns `None` when the call must stay as it is.
    pub fn simplify(self, args: &[ExprId], consts: &[Option<&Value>]) -> Option<Simplified> {
        debug_assert_eq!(args.len(), consts.len());
        if consts.iter().all(Option::is_some) {
            let values: Vec<Value> = consts.iter().flatten().map(|v| (*v).clone()).collect();
            return Some(Simplified::Const(self.eval(&values)));
        }
        match self {
            Func::Id => Some(Simplified::Arg(0)),
            Func::BitAnd | Func::BitOr => {
                let (absorbing, neutral) = if self == Func::BitAnd {
                    (Value::zero(), Value::all_ones())
                } else {
                    (Value::all_ones(), Value::zero())
                };
                for (i, c) in consts.iter().enumerate() {
                    match c {
                        Some(v) if **v == absorbing => return Some(Simplified::Const(absorbing)),
                        Some(v) if **v == neutral => return Some(Simplified::Arg(1 - i)),
                        _ => {}
                    }
                }
                None
            }
            Func::Ite | Func::IteStar => {
                let test = consts[0]?;
                if has_one(test) {
                    Some(Simplified::Arg(1))
                } else if is_all_zero(test) {
                    Some(Simplified::Arg(2))
                } else {
                    None
                }
            }
            Func::BitMux => {
                let test = consts[0]?;
                if *test == Value::all_ones() {
                    Some(Simplified::Arg(1))
                } else if *test == Value::zero() {
                    Some(Simplified::Arg(2))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Translates a care mask on the result into care masks on the arguments.
    ///
    /// `consts[i]` is the value of argument `i` when it is a constant; masks
    /// for constant arguments are still returned but carry no meaning.
    pub fn argmasks(self, mask: &Mask, consts: &[Option<&Value>]) -> Vec<Mask> {
        debug_assert_eq!(consts.len(), self.arity());
        let any = mask.any_to_all();
        if mask.is_empty() {
            return vec![Mask::none(); self.arity()];
        }
        let amount = |i: usize| consts[i].and_then(Value::as_u32);
        match self {
            Func::Id | Func::BitNot | Func::Onp | Func::Offp => vec![mask.clone()],
            Func::BitXor | Func::Res | Func::ResAnd | Func::ResOr | Func::Override => {
                vec![mask.clone(), mask.clone()]
            }
            Func::BitAnd => {
                // A constant 0 bit in one operand hides the other operand's bit.
                let care = |c: Option<&Value>| {
                    c.map_or(Mask::all(), |v| Mask::from_bigint(v.upper() | v.lower()))
                };
                vec![mask & &care(consts[1]), mask & &care(consts[0])]
            }
            Func::BitOr => {
                let care = |c: Option<&Value>| {
                    c.map_or(Mask::all(), |v| {
                        Mask::from_bigint(!(v.upper() & v.lower()))
                    })
                };
                vec![mask & &care(consts[1]), mask & &care(consts[0])]
            }
            Func::ZeroX => match amount(0) {
                Some(w) => vec![any, mask.trunc(w)],
                None => vec![any.clone(), any],
            },
            Func::SignX => match amount(0) {
                Some(0) => vec![any, Mask::none()],
                Some(w) => {
                    let above = mask & &!&Mask::low(w);
                    let mut arg = mask.trunc(w);
                    if !above.is_empty() {
                        arg = &arg | &Mask::bit(w - 1);
                    }
                    vec![any, arg]
                }
                None => vec![any.clone(), any],
            },
            Func::Concat => match amount(0) {
                Some(w) => vec![any, mask.trunc(w), mask >> w],
                None => vec![any.clone(), any.clone(), any],
            },
            Func::Rsh => match amount(0) {
                Some(n) => vec![any, mask << n],
                None => vec![any.clone(), any],
            },
            Func::Lsh => match amount(0) {
                Some(n) => vec![any, mask >> n],
                None => vec![any.clone(), any],
            },
            Func::BitSel => {
                if !mask.contains(0) {
                    return vec![Mask::none(), Mask::none()];
                }
                match amount(0) {
                    Some(i) => vec![Mask::all(), Mask::bit(i)],
                    None => vec![Mask::all(), Mask::all()],
                }
            }
            Func::PartSel => match (amount(0), amount(1)) {
                (Some(lsb), Some(w)) => vec![any.clone(), any, mask.trunc(w) << lsb],
                _ => vec![any; 3],
            },
            Func::PartInst => match (amount(0), amount(1)) {
                (Some(lsb), Some(w)) => {
                    let hole = Mask::range(lsb, w);
                    vec![
                        any.clone(),
                        any,
                        mask & &!&hole,
                        (mask >> lsb).trunc(w),
                    ]
                }
                _ => vec![any; 4],
            },
            Func::Ite | Func::IteStar => match consts[0] {
                Some(t) if has_one(t) => vec![any, mask.clone(), Mask::none()],
                Some(t) if is_all_zero(t) => vec![any, Mask::none(), mask.clone()],
                _ => vec![any, mask.clone(), mask.clone()],
            },
            Func::BitMux => match consts[0] {
                Some(t) => {
                    let ones = Mask::from_bigint(t.upper() & t.lower());
                    let zeros = Mask::from_bigint(!(t.upper() | t.lower()));
                    vec![mask.clone(), mask & &!&zeros, mask & &!&ones]
                }
                None => vec![mask.clone(), mask.clone(), mask.clone()],
            },
            Func::Plus | Func::Minus | Func::Times => {
                let filled = mask.fill_below();
                vec![filled.clone(), filled]
            }
            Func::UMinus => vec![mask.fill_below()],
            _ => vec![any; self.arity()],
        }
    }
}

fn has_one(v: &Value) -> bool {
    (v.upper() & v.lower()) != BigInt::from(0)
}

fn is_all_zero(v: &Value) -> bool {
    (v.upper() | v.lower()) == BigInt::from(0)
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Func> for &'static str {
    fn from(f: Func) -> Self {
        f.name()
    }
}

impl TryFrom<String> for Func {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Func::from_name(&name).ok_or_else(|| format!("unknown function '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: i64) -> Value {
        Value::from_int(v)
    }

    #[test]
    fn names_roundtrip() {
        for f in Func::ALL {
            assert_eq!(Func::from_name(f.name()), Some(f));
        }
        assert_eq!(Func::from_name("nope"), None);
    }

    #[test]
    fn serde_by_name() {
        let json = serde_json::to_string(&Func::Ite).unwrap();
        assert_eq!(json, "\"?\"");
        let back: Func = serde_json::from_str("\"bitand\"").unwrap();
        assert_eq!(back, Func::BitAnd);
        assert!(serde_json::from_str::<Func>("\"frob\"").is_err());
    }

    #[test]
    fn eval_structural() {
        assert_eq!(Func::Concat.eval(&[c(4), c(0xa), c(0x3)]), c(0x3a));
        assert_eq!(Func::PartSel.eval(&[c(4), c(4), c(0xab)]), c(0xa));
        assert_eq!(Func::BitSel.eval(&[c(1), c(0b10)]), c(1));
        assert_eq!(Func::PartInst.eval(&[c(4), c(4), c(0xff), c(0)]), c(0x0f));
        assert_eq!(Func::ZeroX.eval(&[Value::x(), c(3)]), Value::x());
    }

    #[test]
    fn simplify_partial() {
        let a = ExprId::from_raw(0);
        let b = ExprId::from_raw(1);
        let zero = c(0);
        let ones = c(-1);
        assert_eq!(
            Func::BitAnd.simplify(&[a, b], &[Some(&zero), None]),
            Some(Simplified::Const(c(0)))
        );
        assert_eq!(
            Func::BitAnd.simplify(&[a, b], &[None, Some(&ones)]),
            Some(Simplified::Arg(0))
        );
        assert_eq!(
            Func::BitOr.simplify(&[a, b], &[Some(&zero), None]),
            Some(Simplified::Arg(1))
        );
        let t = ExprId::from_raw(2);
        assert_eq!(
            Func::Ite.simplify(&[t, a, b], &[Some(&c(1)), None, None]),
            Some(Simplified::Arg(1))
        );
        assert_eq!(
            Func::Ite.simplify(&[t, a, b], &[Some(&zero), None, None]),
            Some(Simplified::Arg(2))
        );
        assert_eq!(Func::Ite.simplify(&[t, a, b], &[Some(&Value::x()), None, None]), None);
        assert_eq!(Func::Plus.simplify(&[a, b], &[None, Some(&zero)]), None);
    }

    #[test]
    fn argmasks_bitwise() {
        let m = Mask::low(4);
        assert_eq!(Func::BitXor.argmasks(&m, &[None, None]), vec![m.clone(), m.clone()]);
        let k = c(0b0011);
        assert_eq!(
            Func::BitAnd.argmasks(&m, &[None, Some(&k)]),
            vec![Mask::low(2), m.clone()]
        );
        assert_eq!(
            Func::BitOr.argmasks(&m, &[None, Some(&k)]),
            vec![Mask::range(2, 2), m.clone()]
        );
    }

    #[test]
    fn argmasks_structural() {
        let m = Mask::low(8);
        let w4 = c(4);
        let masks = Func::Concat.argmasks(&m, &[Some(&w4), None, None]);
        assert_eq!(masks[1], Mask::low(4));
        assert_eq!(masks[2], Mask::low(4));
        let masks = Func::Rsh.argmasks(&Mask::low(2), &[Some(&c(3)), None]);
        assert_eq!(masks[1], Mask::range(3, 2));
        let masks = Func::PartSel.argmasks(&Mask::low(2), &[Some(&c(4)), Some(&c(2)), None]);
        assert_eq!(masks[2], Mask::range(4, 2));
        let masks = Func::PartInst.argmasks(&Mask::low(8), &[Some(&c(2)), Some(&c(3)), None, None]);
        assert_eq!(masks[2], &Mask::low(2) | &Mask::range(5, 3));
        assert_eq!(masks[3], Mask::low(3));
        let masks = Func::SignX.argmasks(&Mask::range(6, 1), &[Some(&c(4)), None]);
        assert_eq!(masks[1], Mask::bit(3));
    }

    #[test]
    fn argmasks_non_constant_amounts_are_total() {
        let masks = Func::Rsh.argmasks(&Mask::low(1), &[None, None]);
        assert_eq!(masks, vec![Mask::all(), Mask::all()]);
    }

    #[test]
    fn argmasks_conditionals() {
        let m = Mask::low(4);
        let masks = Func::Ite.argmasks(&m, &[Some(&c(1)), None, None]);
        assert_eq!(masks[1], m);
        assert!(masks[2].is_empty());
        let masks = Func::BitMux.argmasks(&m, &[Some(&c(0b0101)), None, None]);
        assert_eq!(masks[1], &Mask::bit(0) | &Mask::bit(2));
        assert_eq!(masks[2], &Mask::bit(1) | &Mask::bit(3));
    }

    #[test]
    fn argmasks_arithmetic_and_reductions() {
        let masks = Func::Plus.argmasks(&Mask::bit(3), &[None, None]);
        assert_eq!(masks[0], Mask::low(4));
        let masks = Func::UAnd.argmasks(&Mask::bit(0), &[None]);
        assert_eq!(masks[0], Mask::all());
        let masks = Func::Lt.argmasks(&Mask::none(), &[None, None]);
        assert!(masks.iter().all(Mask::is_empty));
    }
}
