//! Position classification.
//!
//! Sorts a position into the game stage a scorer would treat it as. Contact
//! and crashed positions follow GNU Backgammon's rules; its two bearoff
//! database classes are folded into a single `Bearoff`.

use serde::Serialize;

use super::metrics::back_checker;
use crate::board::state::{Board, NUM_POINTS, NUM_SLOTS};
use crate::board::Side;

/// Number of position classes.
pub const NUM_CLASSES: usize = 5;

/// Coarse game stage of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionClass {
    /// One side has borne off everything.
    Over,
    /// No contact and every checker is in its home board.
    Bearoff,
    /// No contact.
    Race,
    /// Contact, but one side has too few checkers left to fight.
    Crashed,
    /// Contact.
    Contact,
}

/// All classes in feature-vector order.
pub const ALL_CLASSES: [PositionClass; NUM_CLASSES] = [
    PositionClass::Over,
    PositionClass::Bearoff,
    PositionClass::Race,
    PositionClass::Crashed,
    PositionClass::Contact,
];

impl PositionClass {
    /// Returns the lowercase name used in protocol output.
    pub const fn name(self) -> &'static str {
        match self {
            PositionClass::Over => "over",
            PositionClass::Bearoff => "bearoff",
            PositionClass::Race => "race",
            PositionClass::Crashed => "crashed",
            PositionClass::Contact => "contact",
        }
    }

    /// Index of this class in the one-hot block.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Returns true while the two sides can still hit or block each other.
///
/// Rearmost slots are 0-based with the bar as 24. The checkers have passed
/// each other once the two rearmost slots sum to 22 or less.
pub fn has_contact(board: &Board) -> bool {
    match (
        back_checker(board.side(Side::Zero)),
        back_checker(board.side(Side::One)),
    ) {
        (Some(a), Some(b)) => a + b > NUM_POINTS - 2,
        _ => false,
    }
}

/// Classifies a board. The result does not depend on which side is on roll.
pub fn classify(board: &Board) -> PositionClass {
    let (Some(back0), Some(back1)) = (
        back_checker(board.side(Side::Zero)),
        back_checker(board.side(Side::One)),
    ) else {
        return PositionClass::Over;
    };

    if back0 + back1 > NUM_POINTS - 2 {
        if is_crashed(board.side(Side::Zero)) || is_crashed(board.side(Side::One)) {
            return PositionClass::Crashed;
        }
        return PositionClass::Contact;
    }

    if back0 > 5 || back1 > 5 {
        PositionClass::Race
    } else {
        PositionClass::Bearoff
    }
}

/// A side is crashed when, discounting checkers stacked deep on its lowest
/// points, six or fewer remain to play with.
fn is_crashed(own: &[u8; NUM_SLOTS]) -> bool {
    let total: i32 = own.iter().map(|&c| c as i32).sum();
    let ace = own[0] as i32;
    let deuce = own[1] as i32;

    if total <= 6 {
        return true;
    }
    if ace > 1 {
        total - ace <= 6 || (deuce > 1 && 1 + total - (ace + deuce) <= 6)
    } else {
        total - (deuce - 1) <= 6
    }
}
