//! GNU Backgammon position IDs.
//!
//! A position ID is a 14-character base64 string (no padding) wrapping an
//! 80-bit key. The key lists the 25 slots of array 0 and then the 25 slots
//! of array 1; each slot is a run of 1-bits, one per checker, closed by a
//! 0-bit. Bits fill each byte from the least significant end. Whatever is
//! left of the 80 bits is zero.
//!
//! Array 1 is the side on roll in GNU Backgammon's convention.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

use crate::board::state::{Board, BoardError, NUM_SLOTS};

/// Length of a position ID in characters.
pub const POSITION_ID_LEN: usize = 14;

/// Length of the decoded key in bytes.
const KEY_LEN: usize = 10;

/// Bits in the decoded key.
const KEY_BITS: usize = KEY_LEN * 8;

/// Position ID of the standard opening position.
pub const STARTING_POSITION_ID: &str = "4HPwATDgc/ABMA";

/// Errors from decoding a position ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionIdError {
    #[error("position ID must be 14 characters, got {0}")]
    WrongLength(usize),

    #[error("position ID is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("position ID key is malformed: {0}")]
    MalformedKey(&'static str),

    #[error("position ID describes an invalid board: {0}")]
    InvalidBoard(#[from] BoardError),
}

/// Decodes a position ID into a validated board.
///
/// Borne-off counts are whatever each side is missing from its 15 checkers.
pub fn decode_position_id(id: &str) -> Result<Board, PositionIdError> {
    let len = id.chars().count();
    if len != POSITION_ID_LEN {
        return Err(PositionIdError::WrongLength(len));
    }
    let bytes = STANDARD_NO_PAD.decode(id)?;
    let key: [u8; KEY_LEN] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| PositionIdError::MalformedKey("wrong key length"))?;

    let bit = |i: usize| (key[i / 8] >> (i % 8)) & 1 == 1;

    let mut checkers = [[0u8; NUM_SLOTS]; 2];
    let mut pos = 0;
    for array in checkers.iter_mut() {
        for slot in array.iter_mut() {
            loop {
                if pos >= KEY_BITS {
                    return Err(PositionIdError::MalformedKey("key runs past 80 bits"));
                }
                let set = bit(pos);
                pos += 1;
                if !set {
                    break;
                }
                *slot += 1;
            }
        }
    }
    if (pos..KEY_BITS).any(bit) {
        return Err(PositionIdError::MalformedKey("trailing bits set"));
    }

    Ok(Board::from_counts(checkers)?)
}

/// Encodes a board as a position ID.
///
/// The board should be valid; a board with more than 15 checkers on one side
/// does not fit in the key and is truncated.
pub fn encode_position_id(board: &Board) -> String {
    let mut key = [0u8; KEY_LEN];
    let mut pos = 0;
    'outer: for array in &board.checkers {
        for &count in array {
            for _ in 0..count {
                if pos >= KEY_BITS {
                    break 'outer;
                }
                key[pos / 8] |= 1 << (pos % 8);
                pos += 1;
            }
            pos += 1;
        }
    }
    STANDARD_NO_PAD.encode(key)
}
