//! Board representation.
//!
//! Contains the two-sided checker layout and the side identifiers used to
//! pick which array is on roll.

pub mod side;
pub mod state;

pub use side::{Side, ALL_SIDES};
pub use state::{Board, BoardError, BAR, BAR_PIPS, CHECKERS_PER_SIDE, NUM_POINTS, NUM_SLOTS};
