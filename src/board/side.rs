//! Side identifiers.
//!
//! A board holds one checker array per side. `Side` names which array is
//! meant, and is the side-to-move indicator passed to feature extraction.

use serde::{Deserialize, Serialize};

/// One of the two players, identified by the index of its board array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Zero = 0,
    One = 1,
}

/// Both sides in array order.
pub const ALL_SIDES: [Side; 2] = [Side::Zero, Side::One];

impl Side {
    /// Returns the board array index for this side.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the other side.
    #[inline]
    pub const fn opponent(self) -> Side {
        match self {
            Side::Zero => Side::One,
            Side::One => Side::Zero,
        }
    }

    /// Parses a raw side indicator. Only 0 and 1 are valid.
    pub fn from_index(i: i32) -> Option<Side> {
        match i {
            0 => Some(Side::Zero),
            1 => Some(Side::One),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for s in ALL_SIDES {
            assert_eq!(Side::from_index(s.index() as i32), Some(s));
        }
    }

    #[test]
    fn out_of_range_indicators_rejected() {
        assert_eq!(Side::from_index(-1), None);
        assert_eq!(Side::from_index(2), None);
        assert_eq!(Side::from_index(i32::MAX), None);
    }

    #[test]
    fn opponent_is_involution() {
        assert_eq!(Side::Zero.opponent(), Side::One);
        assert_eq!(Side::One.opponent(), Side::Zero);
        for s in ALL_SIDES {
            assert_eq!(s.opponent().opponent(), s);
        }
    }
}
