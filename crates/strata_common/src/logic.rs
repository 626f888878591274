//! Single-bit four-state logic values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One bit of a 4-state [`Value`](crate::Value).
///
/// The four states represent:
/// - `Zero`: logic low (driven 0)
/// - `One`: logic high (driven 1)
/// - `X`: unknown or conflicting value
/// - `Z`: high-impedance (not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown.
    X = 2,
    /// High-impedance.
    Z = 3,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Decodes the (upper, lower) bit pair of the 4-state encoding.
    pub fn from_pair(upper: bool, lower: bool) -> Self {
        match (upper, lower) {
            (false, false) => Logic::Zero,
            (true, true) => Logic::One,
            (true, false) => Logic::X,
            (false, true) => Logic::Z,
        }
    }

    /// Encodes this bit as an (upper, lower) pair.
    pub fn to_pair(self) -> (bool, bool) {
        match self {
            Logic::Zero => (false, false),
            Logic::One => (true, true),
            Logic::X => (true, false),
            Logic::Z => (false, true),
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "x"),
            Logic::Z => write!(f, "z"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic;

    #[test]
    fn pair_encoding_is_bijective() {
        for l in [Logic::Zero, Logic::One, Logic::X, Logic::Z] {
            let (u, lo) = l.to_pair();
            assert_eq!(Logic::from_pair(u, lo), l);
        }
    }

    #[test]
    fn from_char_valid() {
        assert_eq!(Logic::from_char('0'), Some(Logic::Zero));
        assert_eq!(Logic::from_char('1'), Some(Logic::One));
        assert_eq!(Logic::from_char('X'), Some(Logic::X));
        assert_eq!(Logic::from_char('z'), Some(Logic::Z));
        assert_eq!(Logic::from_char('2'), None);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}{}{}{}", Logic::One, Logic::Zero, Logic::X, Logic::Z), "10xz");
    }
}
