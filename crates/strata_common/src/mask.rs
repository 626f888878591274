//! Bit care masks over arbitrary-precision integers.
//!
//! A [`Mask`] records which bits of a value matter to some consumer. Masks are
//! width-polymorphic: a negative mask has infinitely many care bits above its
//! highest clear bit, which is how "every bit of this operand" is written
//! without knowing the operand's width.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Shl, Shr};

/// A set of bit positions, represented as a two's complement bit pattern.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mask(BigInt);

impl Mask {
    /// The empty mask.
    pub fn none() -> Self {
        Self(BigInt::zero())
    }

    /// The mask containing every bit position.
    pub fn all() -> Self {
        Self(BigInt::from(-1))
    }

    /// The mask of the low `width` bits.
    pub fn low(width: u32) -> Self {
        Self((BigInt::one() << width) - 1)
    }

    /// The mask containing only bit `index`.
    pub fn bit(index: u32) -> Self {
        Self(BigInt::one() << index)
    }

    /// The mask of `width` bits starting at `lsb`.
    pub fn range(lsb: u32, width: u32) -> Self {
        Self::low(width) << lsb
    }

    /// Wraps a raw two's complement pattern.
    pub fn from_bigint(bits: BigInt) -> Self {
        Self(bits)
    }

    /// Returns the raw two's complement pattern.
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Returns `true` if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if infinitely many bits are set.
    pub fn is_infinite(&self) -> bool {
        self.0.is_negative()
    }

    /// Returns `true` if bit `index` is set.
    pub fn contains(&self, index: u32) -> bool {
        self.0.bit(u64::from(index))
    }

    /// Returns `true` if the two masks share a set bit.
    pub fn intersects(&self, other: &Mask) -> bool {
        !(self & other).is_empty()
    }

    /// Restricts the mask to the low `width` bits.
    pub fn trunc(&self, width: u32) -> Mask {
        self & &Mask::low(width)
    }

    /// Returns the mask of every bit at or below the highest set bit.
    ///
    /// This is the care set of a carry-propagating operation: output bit `i`
    /// of an adder depends on every operand bit `j <= i`.
    pub fn fill_below(&self) -> Mask {
        if self.is_infinite() {
            Mask::all()
        } else if self.is_empty() {
            Mask::none()
        } else {
            Mask::low(self.0.bits() as u32)
        }
    }

    /// Returns `Mask::all()` if any bit is set, otherwise the empty mask.
    pub fn any_to_all(&self) -> Mask {
        if self.is_empty() {
            Mask::none()
        } else {
            Mask::all()
        }
    }

    /// Iterates over the set bit positions below `width`, in ascending order.
    pub fn bits_below(&self, width: u32) -> impl Iterator<Item = u32> + '_ {
        (0..width).filter(move |&i| self.contains(i))
    }

    /// Counts the set bits below `width`.
    pub fn count_below(&self, width: u32) -> usize {
        self.bits_below(width).count()
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::none()
    }
}

impl BitAnd for &Mask {
    type Output = Mask;

    fn bitand(self, rhs: Self) -> Mask {
        Mask(&self.0 & &rhs.0)
    }
}

impl BitOr for &Mask {
    type Output = Mask;

    fn bitor(self, rhs: Self) -> Mask {
        Mask(&self.0 | &rhs.0)
    }
}

impl Not for &Mask {
    type Output = Mask;

    fn not(self) -> Mask {
        Mask(!&self.0)
    }
}

impl Shl<u32> for Mask {
    type Output = Mask;

    fn shl(self, rhs: u32) -> Mask {
        Mask(self.0 << rhs)
    }
}

impl Shr<u32> for Mask {
    type Output = Mask;

    fn shr(self, rhs: u32) -> Mask {
        Mask(self.0 >> rhs)
    }
}

impl Shl<u32> for &Mask {
    type Output = Mask;

    fn shl(self, rhs: u32) -> Mask {
        Mask(&self.0 << rhs)
    }
}

impl Shr<u32> for &Mask {
    type Output = Mask;

    fn shr(self, rhs: u32) -> Mask {
        Mask(&self.0 >> rhs)
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "~0x{:x}", !&self.0)
        } else {
            write!(f, "0x{:x}", self.0)
        }
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({self})")
    }
}

impl Serialize for Mask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Mask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<BigInt>()
            .map(Mask)
            .map_err(serde::de::Error::custom)
    }
}
