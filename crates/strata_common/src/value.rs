//! Arbitrary-width four-state values.
//!
//! A [`Value`] is a pair of two's complement integers `(upper, lower)` that are
//! implicitly sign-extended to infinite width. Bit `i` of the value is decoded
//! from bit `i` of both components:
//!
//! | upper | lower | bit |
//! |-------|-------|-----|
//! | 1     | 1     | `1` |
//! | 0     | 0     | `0` |
//! | 1     | 0     | `X` |
//! | 0     | 1     | `Z` |
//!
//! Boolean-valued operations return `-1` (all ones) for true and `0` for false.
//! The operations here exist to fold constant subexpressions; they are not a
//! general-purpose simulator.

use crate::Logic;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An infinitely sign-extended four-state value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ValueRepr", try_from = "ValueRepr")]
pub struct Value {
    upper: BigInt,
    lower: BigInt,
}

#[derive(Clone, Serialize, Deserialize)]
struct ValueRepr {
    upper: String,
    lower: String,
}

impl From<Value> for ValueRepr {
    fn from(v: Value) -> Self {
        ValueRepr {
            upper: v.upper.to_string(),
            lower: v.lower.to_string(),
        }
    }
}

impl TryFrom<ValueRepr> for Value {
    type Error = String;

    fn try_from(r: ValueRepr) -> Result<Self, Self::Error> {
        let upper = r.upper.parse::<BigInt>().map_err(|e| e.to_string())?;
        let lower = r.lower.parse::<BigInt>().map_err(|e| e.to_string())?;
        Ok(Value { upper, lower })
    }
}

fn low_mask(width: u32) -> BigInt {
    (BigInt::one() << width) - 1
}

fn bool_value(b: bool) -> Value {
    if b {
        Value::all_ones()
    } else {
        Value::zero()
    }
}

fn sign_ext_int(width: u32, v: &BigInt) -> BigInt {
    if width == 0 {
        return BigInt::zero();
    }
    let low = v & low_mask(width);
    if low.bit(u64::from(width - 1)) {
        low - (BigInt::one() << width)
    } else {
        low
    }
}

impl Value {
    /// Builds a value from its raw components.
    pub fn from_bits(upper: BigInt, lower: BigInt) -> Self {
        Self { upper, lower }
    }

    /// Builds a two-valued value from an integer.
    pub fn from_int(v: impl Into<BigInt>) -> Self {
        let v = v.into();
        Self {
            upper: v.clone(),
            lower: v,
        }
    }

    /// Builds a two-valued value from an unsigned integer.
    pub fn from_u64(v: u64) -> Self {
        Self::from_int(v)
    }

    /// The all-zeros value.
    pub fn zero() -> Self {
        Self::from_int(0)
    }

    /// The all-ones value (`-1`), also the boolean true.
    pub fn all_ones() -> Self {
        Self::from_int(-1)
    }

    /// The all-X value.
    pub fn x() -> Self {
        Self {
            upper: BigInt::from(-1),
            lower: BigInt::zero(),
        }
    }

    /// The all-Z value.
    pub fn z() -> Self {
        Self {
            upper: BigInt::zero(),
            lower: BigInt::from(-1),
        }
    }

    /// Parses an MSB-first string of `0`, `1`, `x` and `z` characters.
    ///
    /// Bits above the string are zero. Underscores are ignored.
    pub fn from_logic_str(s: &str) -> Option<Self> {
        let mut upper = BigInt::zero();
        let mut lower = BigInt::zero();
        for c in s.chars().filter(|&c| c != '_') {
            let (u, l) = Logic::from_char(c)?.to_pair();
            upper = (upper << 1u32) | BigInt::from(u as u8);
            lower = (lower << 1u32) | BigInt::from(l as u8);
        }
        Some(Self { upper, lower })
    }

    /// Returns the upper component.
    pub fn upper(&self) -> &BigInt {
        &self.upper
    }

    /// Returns the lower component.
    pub fn lower(&self) -> &BigInt {
        &self.lower
    }

    /// Returns the logic value of bit `index`.
    pub fn bit(&self, index: u32) -> Logic {
        let i = u64::from(index);
        Logic::from_pair(self.upper.bit(i), self.lower.bit(i))
    }

    /// Returns `true` if no bit is X or Z.
    pub fn is_2vec(&self) -> bool {
        self.upper == self.lower
    }

    /// Returns the integer value if the value is two-valued.
    pub fn as_int(&self) -> Option<&BigInt> {
        self.is_2vec().then_some(&self.upper)
    }

    /// Returns the value as a `u32` if it is two-valued and in range.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_int().and_then(|v| u32::try_from(v).ok())
    }

    fn map2(&self, f: impl Fn(&BigInt) -> BigInt) -> Value {
        Value {
            upper: f(&self.upper),
            lower: f(&self.lower),
        }
    }

    // Bits known to be 1 and bits known to be 0.
    fn onset(&self) -> BigInt {
        &self.upper & &self.lower
    }

    fn offset(&self) -> BigInt {
        !(&self.upper | &self.lower)
    }

    fn from_sets(ones: BigInt, zeros: BigInt) -> Value {
        Value {
            upper: !zeros,
            lower: ones,
        }
    }

    /// Bitwise negation; X and Z bits become X.
    pub fn bitnot(&self) -> Value {
        Value::from_sets(self.offset(), self.onset())
    }

    /// Bitwise AND; Z inputs act like X.
    pub fn bitand(&self, other: &Value) -> Value {
        Value::from_sets(
            self.onset() & other.onset(),
            self.offset() | other.offset(),
        )
    }

    /// Bitwise OR; Z inputs act like X.
    pub fn bitor(&self, other: &Value) -> Value {
        Value::from_sets(
            self.onset() | other.onset(),
            self.offset() & other.offset(),
        )
    }

    /// Bitwise XOR; any X or Z input bit yields X.
    pub fn bitxor(&self, other: &Value) -> Value {
        let (a1, a0, b1, b0) = (self.onset(), self.offset(), other.onset(), other.offset());
        Value::from_sets((&a1 & &b0) | (&a0 & &b1), (&a0 & &b0) | (&a1 & &b1))
    }

    /// Wired resolution: Z yields to the other driver, disagreement is X.
    pub fn res(&self, other: &Value) -> Value {
        Value {
            upper: &self.upper | &other.upper,
            lower: &self.lower & &other.lower,
        }
    }

    /// Wired-AND resolution: 0 dominates, Z yields.
    pub fn resand(&self, other: &Value) -> Value {
        let zeros = self.offset() | other.offset();
        Value {
            upper: (&self.upper | &other.upper) & !&zeros,
            lower: &self.lower & &other.lower & !&zeros,
        }
    }

    /// Wired-OR resolution: 1 dominates, Z yields.
    pub fn resor(&self, other: &Value) -> Value {
        Value {
            upper: &self.upper | &other.upper,
            lower: self.onset() | other.onset() | (&self.lower & &other.lower),
        }
    }

    /// Takes `self` wherever it is not Z, `other` elsewhere.
    pub fn override_with(&self, other: &Value) -> Value {
        let z = !&self.upper & &self.lower;
        Value {
            upper: &self.upper | (&other.upper & &z),
            lower: (&self.lower & !&z) | (&other.lower & &z),
        }
    }

    /// Two-valued value set where a bit may be 1 (the bit is 1 or X).
    pub fn onp(&self) -> Value {
        Value::from_int(self.upper.clone())
    }

    /// Two-valued value set where a bit may be 0 (the bit is 0 or X).
    pub fn offp(&self) -> Value {
        Value::from_int(!&self.lower)
    }

    /// Keeps the low `width` bits, zeroing the rest.
    pub fn zero_ext(&self, width: u32) -> Value {
        let m = low_mask(width);
        self.map2(|v| v & &m)
    }

    /// Keeps the low `width` bits, sign-extending bit `width - 1`.
    pub fn sign_ext(&self, width: u32) -> Value {
        self.map2(|v| sign_ext_int(width, v))
    }

    /// The low `width` bits of `low` followed by `high`.
    pub fn concat(width: u32, low: &Value, high: &Value) -> Value {
        let l = low.zero_ext(width);
        Value {
            upper: l.upper | (&high.upper << width),
            lower: l.lower | (&high.lower << width),
        }
    }

    /// Shifts right by `amount` bits.
    pub fn rsh(&self, amount: u32) -> Value {
        self.map2(|v| v >> amount)
    }

    /// Shifts left by `amount` bits, filling with zeros.
    pub fn lsh(&self, amount: u32) -> Value {
        self.map2(|v| v << amount)
    }

    /// Replaces bits `[lsb, lsb + width)` of `self` with the low bits of `new`.
    pub fn part_install(&self, lsb: u32, width: u32, new: &Value) -> Value {
        let hole = !(low_mask(width) << lsb);
        let ins = new.zero_ext(width).lsh(lsb);
        Value {
            upper: (&self.upper & &hole) | ins.upper,
            lower: (&self.lower & &hole) | ins.lower,
        }
    }

    fn merge(a: &Value, b: &Value, keep_xz: bool) -> Value {
        let same = if keep_xz {
            !((&a.upper ^ &b.upper) | (&a.lower ^ &b.lower))
        } else {
            (a.onset() & b.onset()) | (a.offset() & b.offset())
        };
        let x = Value::x();
        Value {
            upper: (&a.upper & &same) | (&x.upper & !&same),
            lower: &a.lower & &same,
        }
    }

    /// `test ? then : else`: any 1 bit selects `then`, all-zero selects `else`,
    /// otherwise bits on which both branches agree survive and the rest are X.
    pub fn ite(test: &Value, then: &Value, els: &Value) -> Value {
        Self::ite_impl(test, then, els, false)
    }

    /// Like [`Value::ite`] but an ambiguous test also keeps agreeing X and Z bits.
    pub fn ite_star(test: &Value, then: &Value, els: &Value) -> Value {
        Self::ite_impl(test, then, els, true)
    }

    fn ite_impl(test: &Value, then: &Value, els: &Value, keep_xz: bool) -> Value {
        if !test.onset().is_zero() {
            then.clone()
        } else if test.offset() == BigInt::from(-1) {
            els.clone()
        } else {
            Self::merge(then, els, keep_xz)
        }
    }

    /// Per-bit multiplexer: where `test` is 1 take `then`, where 0 take `else`,
    /// elsewhere merge.
    pub fn bitmux(test: &Value, then: &Value, els: &Value) -> Value {
        let ones = test.onset();
        let zeros = test.offset();
        let unknown = !(&ones | &zeros);
        let merged = Self::merge(then, els, false);
        Value {
            upper: (&then.upper & &ones) | (&els.upper & &zeros) | (&merged.upper & &unknown),
            lower: (&then.lower & &ones) | (&els.lower & &zeros) | (&merged.lower & &unknown),
        }
    }

    /// Reduction AND over the infinite extension.
    pub fn uand(&self) -> Value {
        if !self.offset().is_zero() {
            Value::zero()
        } else if self.onset() == BigInt::from(-1) {
            Value::all_ones()
        } else {
            Value::x()
        }
    }

    /// Reduction OR over the infinite extension.
    pub fn uor(&self) -> Value {
        if !self.onset().is_zero() {
            Value::all_ones()
        } else if self.offset() == BigInt::from(-1) {
            Value::zero()
        } else {
            Value::x()
        }
    }

    /// Reduction XOR; X unless two-valued and non-negative.
    pub fn uxor(&self) -> Value {
        match self.as_int() {
            Some(v) if !v.is_negative() => bool_value(v.magnitude().count_ones() % 2 == 1),
            _ => Value::x(),
        }
    }

    fn arith2(&self, other: &Value, f: impl Fn(&BigInt, &BigInt) -> Option<BigInt>) -> Value {
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => f(a, b).map(Value::from_int).unwrap_or_else(Value::x),
            _ => Value::x(),
        }
    }

    /// Integer addition.
    pub fn plus(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| Some(a + b))
    }

    /// Integer subtraction.
    pub fn minus(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| Some(a - b))
    }

    /// Integer negation.
    pub fn uminus(&self) -> Value {
        self.as_int().map(|v| Value::from_int(-v)).unwrap_or_else(Value::x)
    }

    /// Integer multiplication.
    pub fn times(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| Some(a * b))
    }

    /// Integer division truncating toward zero; division by zero is X.
    pub fn quotient(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| (!b.is_zero()).then(|| a / b))
    }

    /// Remainder with the sign of the dividend; division by zero is X.
    pub fn remainder(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| (!b.is_zero()).then(|| a % b))
    }

    /// Exponentiation with a non-negative exponent that fits in `u32`.
    pub fn pow(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| u32::try_from(b).ok().map(|e| a.pow(e)))
    }

    /// Signed less-than.
    pub fn lt(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| Some(if a < b { BigInt::from(-1) } else { BigInt::zero() }))
    }

    /// Two-valued equality; X if either side has X or Z bits.
    pub fn equal(&self, other: &Value) -> Value {
        self.arith2(other, |a, b| Some(if a == b { BigInt::from(-1) } else { BigInt::zero() }))
    }

    /// Case equality (`===`): exact four-state comparison, never X.
    pub fn eqeq_eq(&self, other: &Value) -> Value {
        bool_value(self == other)
    }

    /// Wildcard equality (`==?`): X and Z bits of `other` match anything.
    pub fn wildeq(&self, other: &Value) -> Value {
        let care = !(&other.upper ^ &other.lower);
        let self_unknown = !(&self.upper ^ &self.lower).is_zero();
        let unknown = (&self.upper ^ &self.lower) & &care;
        if self_unknown && !unknown.is_zero() {
            return Value::x();
        }
        bool_value(((&self.upper ^ &other.upper) & &care).is_zero())
    }

    /// Zero when two-valued, X otherwise.
    pub fn xdet(&self) -> Value {
        if self.is_2vec() {
            Value::zero()
        } else {
            Value::x()
        }
    }

    fn popcount(&self) -> Option<u64> {
        match self.as_int() {
            Some(v) if !v.is_negative() => Some(v.magnitude().count_ones()),
            _ => None,
        }
    }

    /// Number of set bits of a non-negative two-valued value.
    pub fn countones(&self) -> Value {
        self.popcount().map(Value::from_u64).unwrap_or_else(Value::x)
    }

    /// True iff exactly one bit is set.
    pub fn onehot(&self) -> Value {
        self.popcount().map(|n| bool_value(n == 1)).unwrap_or_else(Value::x)
    }

    /// True iff at most one bit is set.
    pub fn onehot0(&self) -> Value {
        self.popcount().map(|n| bool_value(n <= 1)).unwrap_or_else(Value::x)
    }

    /// Ceiling base-2 logarithm of a non-negative two-valued value.
    pub fn clog2(&self) -> Value {
        match self.as_int() {
            Some(v) if !v.is_negative() => {
                if *v <= BigInt::one() {
                    Value::zero()
                } else {
                    Value::from_u64((v - 1u32).bits())
                }
            }
            _ => Value::x(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Logic> for Value {
    fn from(l: Logic) -> Self {
        let (u, lo) = l.to_pair();
        Value {
            upper: if u { BigInt::from(-1) } else { BigInt::zero() },
            lower: if lo { BigInt::from(-1) } else { BigInt::zero() },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_2vec() {
            write!(f, "{}", self.upper)
        } else {
            write!(f, "({} . {})", self.upper, self.lower)
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Value {
        Value::from_logic_str(s).unwrap()
    }

    #[test]
    fn bit_decoding() {
        let val = v("10xz");
        assert_eq!(val.bit(3), Logic::One);
        assert_eq!(val.bit(2), Logic::Zero);
        assert_eq!(val.bit(1), Logic::X);
        assert_eq!(val.bit(0), Logic::Z);
        assert_eq!(val.bit(100), Logic::Zero);
        assert!(!val.is_2vec());
        assert!(v("0110").is_2vec());
    }

    #[test]
    fn infinite_constants() {
        assert_eq!(Value::x().bit(77), Logic::X);
        assert_eq!(Value::z().bit(77), Logic::Z);
        assert_eq!(Value::all_ones().bit(77), Logic::One);
        assert_eq!(Value::from(Logic::Z), Value::z());
    }

    #[test]
    fn bitwise_ops() {
        assert_eq!(v("01xz").bitnot().zero_ext(4), v("10xx"));
        assert_eq!(v("0011").bitand(&v("0x1z")).zero_ext(4), v("001x"));
        assert_eq!(v("0011").bitor(&v("x01z")).zero_ext(4), v("x011"));
        assert_eq!(v("0101").bitxor(&v("0110")), v("0011"));
        assert_eq!(v("01x").bitxor(&v("111")), v("10x"));
    }

    #[test]
    fn and_with_zero_dominates_x() {
        assert_eq!(Value::zero().bitand(&Value::x()), Value::zero());
        assert_eq!(Value::all_ones().bitor(&Value::x()), Value::all_ones());
    }

    #[test]
    fn resolution() {
        assert_eq!(v("zz01").res(&v("10zz")), v("1001"));
        assert_eq!(v("1").res(&v("0")), v("x"));
        assert_eq!(Value::z().res(&Value::z()), Value::z());
        assert_eq!(v("0z1").resand(&v("1z1")), v("0z1"));
        assert_eq!(v("1z0").resor(&v("0z0")), v("1z0"));
        assert_eq!(v("z1").override_with(&v("01")), v("01"));
    }

    #[test]
    fn extension_and_concat() {
        assert_eq!(v("101").sign_ext(3), Value::from_int(-3));
        assert_eq!(Value::from_int(-1).zero_ext(4), Value::from_int(15));
        assert_eq!(Value::concat(2, &v("11"), &v("0")), v("011"));
        assert_eq!(Value::concat(1, &Value::z(), &v("1")).zero_ext(2), v("1z"));
        assert_eq!(v("1100").rsh(2), v("11"));
        assert_eq!(v("11").lsh(2), v("1100"));
        assert_eq!(v("0000").part_install(1, 2, &v("11")), v("0110"));
    }

    #[test]
    fn conditionals() {
        let a = v("1100");
        let b = v("1010");
        assert_eq!(Value::ite(&v("1"), &a, &b), a);
        assert_eq!(Value::ite(&v("0"), &a, &b), b);
        assert_eq!(Value::ite(&Value::x(), &a, &b), v("1xx0"));
        assert_eq!(Value::bitmux(&v("0011"), &a, &b), v("1000"));
        assert_eq!(Value::ite_star(&Value::x(), &v("z"), &v("z")), v("z"));
        assert_eq!(Value::ite(&Value::x(), &v("z"), &v("z")), Value::x());
    }

    #[test]
    fn reductions() {
        assert_eq!(Value::all_ones().uand(), Value::all_ones());
        assert_eq!(v("10").uand(), Value::zero());
        assert_eq!(v("10").uor(), Value::all_ones());
        assert_eq!(Value::zero().uor(), Value::zero());
        assert_eq!(v("x0").uor(), Value::x());
        assert_eq!(v("111").uxor(), Value::all_ones());
        assert_eq!(v("11").uxor(), Value::zero());
    }

    #[test]
    fn arithmetic() {
        let three = Value::from_int(3);
        let four = Value::from_int(4);
        assert_eq!(three.plus(&four), Value::from_int(7));
        assert_eq!(three.minus(&four), Value::from_int(-1));
        assert_eq!(three.times(&four), Value::from_int(12));
        assert_eq!(Value::from_int(-7).quotient(&Value::from_int(2)), Value::from_int(-3));
        assert_eq!(Value::from_int(-7).remainder(&Value::from_int(2)), Value::from_int(-1));
        assert_eq!(three.quotient(&Value::zero()), Value::x());
        assert_eq!(Value::from_int(2).pow(&Value::from_int(10)), Value::from_int(1024));
        assert_eq!(three.plus(&Value::x()), Value::x());
    }

    #[test]
    fn comparisons() {
        assert_eq!(Value::from_int(3).lt(&Value::from_int(4)), Value::all_ones());
        assert_eq!(Value::from_int(3).equal(&Value::from_int(4)), Value::zero());
        assert_eq!(v("x").equal(&v("x")), Value::x());
        assert_eq!(v("x").eqeq_eq(&v("x")), Value::all_ones());
        assert_eq!(v("101").wildeq(&v("1x1")), Value::all_ones());
        assert_eq!(v("100").wildeq(&v("1x1")), Value::zero());
        assert_eq!(v("1x1").wildeq(&v("101")), Value::x());
    }

    #[test]
    fn counting() {
        assert_eq!(v("1011").countones(), Value::from_int(3));
        assert_eq!(v("0100").onehot(), Value::all_ones());
        assert_eq!(v("0000").onehot(), Value::zero());
        assert_eq!(v("0000").onehot0(), Value::all_ones());
        assert_eq!(Value::from_int(5).clog2(), Value::from_int(3));
        assert_eq!(Value::from_int(4).clog2(), Value::from_int(2));
        assert_eq!(Value::from_int(1).clog2(), Value::zero());
        assert_eq!(v("1x").xdet(), Value::x());
    }

    #[test]
    fn display() {
        assert_eq!(Value::from_int(42).to_string(), "42");
        assert_eq!(Value::x().to_string(), "(-1 . 0)");
    }

    #[test]
    fn serde_roundtrip() {
        for val in [Value::x(), Value::z(), v("1x0z"), Value::from_int(-5)] {
            let json = serde_json::to_string(&val).unwrap();
            let back: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(val, back);
        }
    }
}
