//! Board state representation.
//!
//! Holds the checker layout of a backgammon position: a count per point and
//! bar for each side, plus the checkers each side has borne off.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::side::{Side, ALL_SIDES};

/// Number of points on the board.
pub const NUM_POINTS: usize = 24;

/// Slots per side: 24 points followed by the bar.
pub const NUM_SLOTS: usize = 25;

/// Slot index of the bar.
pub const BAR: usize = 24;

/// Checkers each side starts with.
pub const CHECKERS_PER_SIDE: u8 = 15;

/// Pip distance of a checker on the bar.
pub const BAR_PIPS: u32 = 25;

/// One side's opening layout: 2 on the 24-point, 5 on the 13, 3 on the 8,
/// 5 on the 6.
const STARTING_LAYOUT: [u8; NUM_SLOTS] = [
    0, 0, 0, 0, 0, 5, 0, 3, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0,
];

/// Errors from board validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("side {side:?} slot {slot} has negative count {count}")]
    NegativeCount { side: Side, slot: usize, count: i32 },

    #[error("side {side:?} accounts for {total} checkers, expected 15")]
    CheckerCount { side: Side, total: u32 },

    #[error("point {point} is occupied by both sides")]
    SharedPoint { point: usize },
}

/// A two-sided board.
///
/// Each side's array is numbered from that side's own perspective: slot 0 is
/// its ace point, slot 23 its 24-point and slot 24 its bar. Slot `i` of one
/// side is the same physical point as slot `23 - i` of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Checker counts per side: 24 points then the bar.
    pub checkers: [[u8; NUM_SLOTS]; 2],
    /// Checkers borne off per side.
    pub off: [u8; 2],
}

impl Board {
    /// Creates a board from raw parts without checking any invariant.
    pub const fn new(checkers: [[u8; NUM_SLOTS]; 2], off: [u8; 2]) -> Self {
        Board { checkers, off }
    }

    /// Creates a board from on-board counts, deriving borne-off checkers.
    pub fn from_counts(checkers: [[u8; NUM_SLOTS]; 2]) -> Result<Self, BoardError> {
        let mut off = [0u8; 2];
        for side in ALL_SIDES {
            let total = on_board_count(&checkers[side.index()]);
            if total > CHECKERS_PER_SIDE as u32 {
                return Err(BoardError::CheckerCount { side, total });
            }
            off[side.index()] = CHECKERS_PER_SIDE - total as u8;
        }
        let board = Board { checkers, off };
        board.validate()?;
        Ok(board)
    }

    /// Creates a board from a GNU Backgammon style `anBoard[2][25]` array.
    pub fn from_gnubg(an_board: &[[i32; NUM_SLOTS]; 2]) -> Result<Self, BoardError> {
        let mut checkers = [[0u8; NUM_SLOTS]; 2];
        for side in ALL_SIDES {
            let raw = &an_board[side.index()];
            let mut total: i64 = 0;
            for (slot, &count) in raw.iter().enumerate() {
                if count < 0 {
                    return Err(BoardError::NegativeCount { side, slot, count });
                }
                total += count as i64;
            }
            if total > CHECKERS_PER_SIDE as i64 {
                let total = u32::try_from(total).unwrap_or(u32::MAX);
                return Err(BoardError::CheckerCount { side, total });
            }
            for (slot, &count) in raw.iter().enumerate() {
                checkers[side.index()][slot] = count as u8;
            }
        }
        Board::from_counts(checkers)
    }

    /// Returns the standard opening position.
    pub const fn starting() -> Self {
        Board {
            checkers: [STARTING_LAYOUT, STARTING_LAYOUT],
            off: [0, 0],
        }
    }

    /// Returns a random valid board.
    ///
    /// Every checker is dropped independently onto a point, the bar or the
    /// borne-off tray, skipping points the other side already holds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut checkers = [[0u8; NUM_SLOTS]; 2];
        let mut off = [0u8; 2];
        for side in ALL_SIDES {
            let s = side.index();
            let o = side.opponent().index();
            for _ in 0..CHECKERS_PER_SIDE {
                loop {
                    // NUM_SLOTS stands for the borne-off tray.
                    let slot = rng.gen_range(0..=NUM_SLOTS);
                    if slot == NUM_SLOTS {
                        off[s] += 1;
                        break;
                    }
                    if slot < NUM_POINTS && checkers[o][NUM_POINTS - 1 - slot] > 0 {
                        continue;
                    }
                    checkers[s][slot] += 1;
                    break;
                }
            }
        }
        Board { checkers, off }
    }

    /// Checks the checker-count and occupancy invariants.
    pub fn validate(&self) -> Result<(), BoardError> {
        for side in ALL_SIDES {
            let total = self.on_board(side) + self.off[side.index()] as u32;
            if total != CHECKERS_PER_SIDE as u32 {
                return Err(BoardError::CheckerCount { side, total });
            }
        }
        for i in 0..NUM_POINTS {
            if self.checkers[0][i] > 0 && self.checkers[1][NUM_POINTS - 1 - i] > 0 {
                return Err(BoardError::SharedPoint { point: i + 1 });
            }
        }
        Ok(())
    }

    /// Returns one side's slot array.
    #[inline]
    pub fn side(&self, side: Side) -> &[u8; NUM_SLOTS] {
        &self.checkers[side.index()]
    }

    /// Checkers a side has on the points or the bar.
    pub fn on_board(&self, side: Side) -> u32 {
        on_board_count(&self.checkers[side.index()])
    }

    /// Returns the same position with the two arrays exchanged.
    pub fn swap_sides(&self) -> Self {
        Board {
            checkers: [self.checkers[1], self.checkers[0]],
            off: [self.off[1], self.off[0]],
        }
    }

    /// Converts to a GNU Backgammon style `anBoard[2][25]` array.
    pub fn to_gnubg(&self) -> [[i32; NUM_SLOTS]; 2] {
        let mut out = [[0i32; NUM_SLOTS]; 2];
        for side in ALL_SIDES {
            for (dst, &src) in out[side.index()].iter_mut().zip(self.side(side)) {
                *dst = src as i32;
            }
        }
        out
    }
}

fn on_board_count(slots: &[u8; NUM_SLOTS]) -> u32 {
    slots.iter().map(|&c| c as u32).sum()
}
