//! Protocol handling.
//!
//! GNU Backgammon position IDs for naming boards on the wire, and the
//! command parser for the line-oriented main loop.

pub mod parser;
pub mod position_id;

pub use parser::{parse_command, Command, PositionSpec};
pub use position_id::{
    decode_position_id, encode_position_id, PositionIdError, POSITION_ID_LEN,
    STARTING_POSITION_ID,
};
