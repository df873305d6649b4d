//! Board state -> feature vector encoding for neural network scoring.
//!
//! Produces a flat [241] f32 vector. The layout is a fixed contract with the
//! downstream scorer:
//!
//!   [0:117]    side on roll
//!   [117:234]  opponent
//!   [234:241]  shared
//!
//! Each side block (117 values):
//!   [0:100]    point encoding, 25 slots x 4 channels (GNU Backgammon base
//!              inputs). Points: [n == 1, n == 2, n >= 3, (n - 3) / 2].
//!              Bar: [n >= 1, n >= 2, n >= 3, (n - 3) / 2].
//!   [100:117]  raw concept counts in `CONCEPT_NAMES` order
//!
//! Shared block (7 values):
//!   [0]        contact
//!   [1]        pip difference (on roll minus opponent)
//!   [2:7]      position class one-hot: [over, bearoff, race, crashed, contact]

use crate::board::side::Side;
use crate::board::state::{Board, BoardError, BAR, NUM_SLOTS};
use crate::eval::{
    classify, has_contact, SideMetrics, ALL_CLASSES, CONCEPT_NAMES, NUM_CLASSES, NUM_CONCEPTS,
};

/// Channels per board slot.
pub const POINT_CHANNELS: usize = 4;

/// Point-encoding values per side.
pub const POINT_FEATURES: usize = NUM_SLOTS * POINT_CHANNELS;

/// Values per side block.
pub const SIDE_FEATURES: usize = POINT_FEATURES + NUM_CONCEPTS;

/// Values in the shared block.
pub const SHARED_FEATURES: usize = 2 + NUM_CLASSES;

/// Total length of a feature vector.
pub const FEATURE_COUNT: usize = 2 * SIDE_FEATURES + SHARED_FEATURES;

/// A complete feature vector.
pub type FeatureVector = [f32; FEATURE_COUNT];

/// Start of the on-roll side block.
pub const ON_ROLL_BASE: usize = 0;
/// Start of the opponent side block.
pub const OPPONENT_BASE: usize = SIDE_FEATURES;
/// Start of the shared block.
pub const SHARED_BASE: usize = 2 * SIDE_FEATURES;

/// Checkers on the bar.
pub const FEAT_BAR: usize = POINT_FEATURES;
/// Checkers borne off.
pub const FEAT_OFF: usize = POINT_FEATURES + 1;
/// Pip count.
pub const FEAT_PIPS: usize = POINT_FEATURES + 2;
/// Points holding exactly one checker.
pub const FEAT_BLOTS: usize = POINT_FEATURES + 3;
/// Points holding two or more checkers.
pub const FEAT_MADE_POINTS: usize = POINT_FEATURES + 4;
/// Made points in the home board.
pub const FEAT_HOME_POINTS: usize = POINT_FEATURES + 5;
/// Blots in the home board.
pub const FEAT_HOME_BLOTS: usize = POINT_FEATURES + 6;
/// Made points in the opponent's home board.
pub const FEAT_ANCHORS: usize = POINT_FEATURES + 7;
/// 1-based slot of the rearmost checker; 25 for the bar.
pub const FEAT_BACK_CHECKER: usize = POINT_FEATURES + 8;
/// Longest run of consecutive made points.
pub const FEAT_PRIME: usize = POINT_FEATURES + 9;
/// Checkers in the home board.
pub const FEAT_HOME_CHECKERS: usize = POINT_FEATURES + 10;
/// Checkers on the 7- through 18-points.
pub const FEAT_OUTFIELD_CHECKERS: usize = POINT_FEATURES + 11;
/// Checkers in the opponent's home board.
pub const FEAT_OPP_HOME_CHECKERS: usize = POINT_FEATURES + 12;
/// Pips still needed to move every checker past the opponent's rearmost one.
pub const FEAT_BREAK_CONTACT: usize = POINT_FEATURES + 13;
/// Rolls that let the opponent's rearmost checker run past this side.
pub const FEAT_ESCAPES: usize = POINT_FEATURES + 14;
/// Rolls out of 36 that fail to escape this side's blockade from the worst start.
pub const FEAT_CONTAINMENT: usize = POINT_FEATURES + 15;
/// Checkers on the 4- through 11-points.
pub const FEAT_BUILDERS: usize = POINT_FEATURES + 16;

/// 1.0 while the two sides can still hit each other.
pub const FEAT_CONTACT: usize = SHARED_BASE;
/// On-roll pips minus opponent pips.
pub const FEAT_PIP_DIFF: usize = SHARED_BASE + 1;
/// Start of the position class one-hot.
pub const FEAT_CLASS: usize = SHARED_BASE + 2;

const POINT_CHANNEL_NAMES: [&str; POINT_CHANNELS] = ["one", "two", "three_plus", "spare"];
const BAR_CHANNEL_NAMES: [&str; POINT_CHANNELS] = ["one_plus", "two_plus", "three_plus", "spare"];

/// Errors from feature extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),

    #[error("invalid side indicator {0}, expected 0 or 1")]
    InvalidSide(i32),
}

/// Extracts the feature vector of `board` with `side` on roll into `out`.
///
/// The board is validated first; on error `out` is left untouched. On
/// success every entry of `out` is overwritten.
pub fn extract_features(
    board: &Board,
    side: Side,
    out: &mut FeatureVector,
) -> Result<(), FeatureError> {
    board.validate()?;
    write_features(board, side, out);
    Ok(())
}

/// Returns the feature vector of `board` with `side` on roll.
pub fn encode_position(board: &Board, side: Side) -> Result<FeatureVector, FeatureError> {
    let mut out = [0.0f32; FEATURE_COUNT];
    extract_features(board, side, &mut out)?;
    Ok(out)
}

/// Extracts features without validating the board.
///
/// The caller must guarantee that `board.validate()` succeeds. Debug builds
/// assert it; release builds produce a meaningless vector for a malformed
/// board.
pub fn extract_features_unchecked(board: &Board, side: Side, out: &mut FeatureVector) {
    debug_assert!(
        board.validate().is_ok(),
        "extract_features_unchecked called with invalid board: {:?}",
        board.validate()
    );
    write_features(board, side, out);
}

/// Extracts features from a GNU Backgammon style `anBoard[2][25]` array and
/// a raw side indicator.
pub fn extract_raw(
    an_board: &[[i32; NUM_SLOTS]; 2],
    which: i32,
    out: &mut FeatureVector,
) -> Result<(), FeatureError> {
    let side = Side::from_index(which).ok_or(FeatureError::InvalidSide(which))?;
    let board = Board::from_gnubg(an_board)?;
    write_features(&board, side, out);
    Ok(())
}

/// Fills every entry of `out`. Each concept is computed from the board
/// arrays directly, never from previously written entries.
fn write_features(board: &Board, side: Side, out: &mut FeatureVector) {
    out.fill(0.0);

    let on_roll = SideMetrics::measure(board, side);
    let opponent = SideMetrics::measure(board, side.opponent());

    encode_side(
        &mut out[ON_ROLL_BASE..OPPONENT_BASE],
        board.side(side),
        &on_roll,
    );
    encode_side(
        &mut out[OPPONENT_BASE..SHARED_BASE],
        board.side(side.opponent()),
        &opponent,
    );

    out[FEAT_CONTACT] = if has_contact(board) { 1.0 } else { 0.0 };
    out[FEAT_PIP_DIFF] = on_roll.pips as f32 - opponent.pips as f32;
    out[FEAT_CLASS + classify(board).index()] = 1.0;
}

/// Writes one side block: point encoding followed by concept counts.
fn encode_side(block: &mut [f32], own: &[u8; NUM_SLOTS], metrics: &SideMetrics) {
    for (slot, &n) in own.iter().enumerate() {
        let base = slot * POINT_CHANNELS;
        if slot == BAR {
            block[base] = flag(n >= 1);
            block[base + 1] = flag(n >= 2);
        } else {
            block[base] = flag(n == 1);
            block[base + 1] = flag(n == 2);
        }
        block[base + 2] = flag(n >= 3);
        block[base + 3] = if n > 3 { (n as f32 - 3.0) / 2.0 } else { 0.0 };
    }

    for (dst, &v) in block[POINT_FEATURES..].iter_mut().zip(&metrics.concepts()) {
        *dst = v as f32;
    }
}

#[inline]
fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Returns the name of the feature at `index`, or None past the end.
///
/// Names look like `on_roll.point_6.spare`, `opponent.bar.one_plus`,
/// `on_roll.pips` or `shared.class.race`.
pub fn feature_name(index: usize) -> Option<String> {
    if index >= FEATURE_COUNT {
        return None;
    }
    if index >= SHARED_BASE {
        let k = index - SHARED_BASE;
        return Some(match k {
            0 => "shared.contact".to_string(),
            1 => "shared.pip_diff".to_string(),
            _ => format!("shared.class.{}", ALL_CLASSES[k - 2].name()),
        });
    }

    let (prefix, k) = if index < OPPONENT_BASE {
        ("on_roll", index - ON_ROLL_BASE)
    } else {
        ("opponent", index - OPPONENT_BASE)
    };
    if k >= POINT_FEATURES {
        return Some(format!("{}.{}", prefix, CONCEPT_NAMES[k - POINT_FEATURES]));
    }
    let slot = k / POINT_CHANNELS;
    let channel = k % POINT_CHANNELS;
    if slot == BAR {
        Some(format!("{}.bar.{}", prefix, BAR_CHANNEL_NAMES[channel]))
    } else {
        Some(format!(
            "{}.point_{}.{}",
            prefix,
            slot + 1,
            POINT_CHANNEL_NAMES[channel]
        ))
    }
}

/// Returns the names of all features in vector order.
pub fn feature_names() -> Vec<String> {
    (0..FEATURE_COUNT).filter_map(feature_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::PositionClass;
    use std::collections::HashSet;

    fn board_from(a: &[(usize, u8)], b: &[(usize, u8)]) -> Board {
        let mut checkers = [[0u8; NUM_SLOTS]; 2];
        for &(slot, count) in a {
            checkers[0][slot] += count;
        }
        for &(slot, count) in b {
            checkers[1][slot] += count;
        }
        Board::from_counts(checkers).expect("test board must be valid")
    }

    fn near_finished_race() -> Board {
        board_from(&[(0, 3), (1, 2), (2, 1)], &[(0, 2), (3, 1)])
    }

    fn blocked_contact() -> Board {
        board_from(
            &[(2, 2), (3, 2), (4, 2), (5, 2), (6, 2), (7, 2), (12, 3)],
            &[(23, 2), (5, 5), (7, 3), (12, 5)],
        )
    }

    #[test]
    fn layout_constants() {
        assert_eq!(POINT_FEATURES, 100);
        assert_eq!(SIDE_FEATURES, 117);
        assert_eq!(SHARED_FEATURES, 7);
        assert_eq!(FEATURE_COUNT, 241);
        assert_eq!(FEAT_BUILDERS, SIDE_FEATURES - 1);
        assert_eq!(FEAT_CLASS + NUM_CLASSES, FEATURE_COUNT);
    }

    #[test]
    fn starting_point_encoding() {
        let v = encode_position(&Board::starting(), Side::Zero).unwrap();
        for base in [ON_ROLL_BASE, OPPONENT_BASE] {
            // 6-point: five checkers.
            let six = base + 5 * POINT_CHANNELS;
            assert_eq!(&v[six..six + 4], &[0.0, 0.0, 1.0, 1.0]);
            // 8-point: three checkers.
            let eight = base + 7 * POINT_CHANNELS;
            assert_eq!(&v[eight..eight + 4], &[0.0, 0.0, 1.0, 0.0]);
            // 24-point: two checkers.
            let back = base + 23 * POINT_CHANNELS;
            assert_eq!(&v[back..back + 4], &[0.0, 1.0, 0.0, 0.0]);
            // Empty 1-point and empty bar.
            assert_eq!(&v[base..base + 4], &[0.0; 4]);
            let bar = base + BAR * POINT_CHANNELS;
            assert_eq!(&v[bar..bar + 4], &[0.0; 4]);
        }
    }

    #[test]
    fn starting_concepts() {
        let v = encode_position(&Board::starting(), Side::Zero).unwrap();
        for base in [ON_ROLL_BASE, OPPONENT_BASE] {
            assert_eq!(v[base + FEAT_PIPS], 167.0);
            assert_eq!(v[base + FEAT_BLOTS], 0.0);
            assert_eq!(v[base + FEAT_MADE_POINTS], 4.0);
            assert_eq!(v[base + FEAT_HOME_POINTS], 1.0);
            assert_eq!(v[base + FEAT_ANCHORS], 1.0);
            assert_eq!(v[base + FEAT_BACK_CHECKER], 24.0);
            assert_eq!(v[base + FEAT_BAR], 0.0);
            assert_eq!(v[base + FEAT_OFF], 0.0);
        }
        assert_eq!(v[FEAT_CONTACT], 1.0);
        assert_eq!(v[FEAT_PIP_DIFF], 0.0);
        assert_eq!(v[FEAT_CLASS + PositionClass::Contact.index()], 1.0);
        assert_eq!(v[FEAT_CLASS..].iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn near_finished_race_pips() {
        let board = near_finished_race();
        let v = encode_position(&board, Side::Zero).unwrap();
        assert_eq!(v[ON_ROLL_BASE + FEAT_PIPS], 10.0);
        assert_eq!(v[OPPONENT_BASE + FEAT_PIPS], 6.0);
        assert_eq!(v[ON_ROLL_BASE + FEAT_OFF], 9.0);
        assert_eq!(v[OPPONENT_BASE + FEAT_OFF], 12.0);
        assert_eq!(v[FEAT_PIP_DIFF], 4.0);
        assert_eq!(v[FEAT_CONTACT], 0.0);
        assert_eq!(v[FEAT_CLASS + PositionClass::Bearoff.index()], 1.0);
    }

    #[test]
    fn side_indicator_selects_first_block() {
        let board = near_finished_race();
        let v = encode_position(&board, Side::One).unwrap();
        assert_eq!(v[ON_ROLL_BASE + FEAT_PIPS], 6.0);
        assert_eq!(v[OPPONENT_BASE + FEAT_PIPS], 10.0);
        assert_eq!(v[FEAT_PIP_DIFF], -4.0);
    }

    #[test]
    fn blocked_contact_pips_and_prime() {
        let v = encode_position(&blocked_contact(), Side::Zero).unwrap();
        assert_eq!(v[ON_ROLL_BASE + FEAT_PIPS], 105.0);
        assert_eq!(v[OPPONENT_BASE + FEAT_PIPS], 167.0);
        assert_eq!(v[ON_ROLL_BASE + FEAT_PRIME], 6.0);
        assert_eq!(v[ON_ROLL_BASE + FEAT_ESCAPES], 0.0);
        assert_eq!(v[ON_ROLL_BASE + FEAT_CONTAINMENT], 36.0);
        assert_eq!(v[ON_ROLL_BASE + FEAT_BUILDERS], 10.0);
        assert_eq!(v[OPPONENT_BASE + FEAT_BUILDERS], 8.0);
        assert_eq!(v[FEAT_PIP_DIFF], -62.0);
        assert_eq!(v[FEAT_CONTACT], 1.0);
    }

    #[test]
    fn bar_and_spare_channels() {
        let mut checkers = [[0u8; NUM_SLOTS]; 2];
        checkers[0][BAR] = 4;
        checkers[0][0] = 11;
        checkers[1][0] = 15;
        let board = Board::from_counts(checkers).unwrap();
        let v = encode_position(&board, Side::Zero).unwrap();
        let bar = BAR * POINT_CHANNELS;
        assert_eq!(&v[bar..bar + 4], &[1.0, 1.0, 1.0, 0.5]);
        assert_eq!(&v[0..4], &[0.0, 0.0, 1.0, 4.0]);
        assert_eq!(v[FEAT_BAR], 4.0);
    }

    #[test]
    fn invalid_board_leaves_output_untouched() {
        let mut board = Board::starting();
        board.checkers[1][12] = 6;
        let mut out = [7.0f32; FEATURE_COUNT];
        let err = extract_features(&board, Side::Zero, &mut out).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::InvalidBoard(BoardError::CheckerCount {
                side: Side::One,
                total: 16
            })
        ));
        assert!(out.iter().all(|&x| x == 7.0));
    }

    #[test]
    fn shared_point_leaves_output_untouched() {
        let mut checkers = [[0u8; NUM_SLOTS]; 2];
        checkers[0][0] = 14;
        checkers[0][2] = 1;
        checkers[1][0] = 13;
        // Side 1's 22-point is side 0's 3-point.
        checkers[1][21] = 2;
        let board = Board::new(checkers, [0, 0]);
        let mut out = [7.0f32; FEATURE_COUNT];
        let err = extract_features(&board, Side::Zero, &mut out).unwrap_err();
        assert_eq!(
            err,
            FeatureError::InvalidBoard(BoardError::SharedPoint { point: 3 })
        );
        assert!(out.iter().all(|&x| x == 7.0));
    }

    #[test]
    fn raw_entry_rejects_bad_side() {
        let raw = Board::starting().to_gnubg();
        let mut out = [7.0f32; FEATURE_COUNT];
        for which in [-1, 2, 99] {
            assert_eq!(
                extract_raw(&raw, which, &mut out),
                Err(FeatureError::InvalidSide(which))
            );
        }
        assert!(out.iter().all(|&x| x == 7.0));
    }

    #[test]
    fn raw_entry_rejects_bad_board() {
        let mut raw = Board::starting().to_gnubg();
        raw[0][3] = 1;
        let mut out = [7.0f32; FEATURE_COUNT];
        assert!(matches!(
            extract_raw(&raw, 0, &mut out),
            Err(FeatureError::InvalidBoard(_))
        ));
        assert!(out.iter().all(|&x| x == 7.0));
    }

    #[test]
    fn raw_entry_matches_typed_entry() {
        let board = blocked_contact();
        let mut raw_out = [0.0f32; FEATURE_COUNT];
        extract_raw(&board.to_gnubg(), 1, &mut raw_out).unwrap();
        let typed = encode_position(&board, Side::One).unwrap();
        assert_eq!(raw_out, typed);
    }

    #[test]
    fn unchecked_matches_checked() {
        let board = blocked_contact();
        let mut out = [0.0f32; FEATURE_COUNT];
        extract_features_unchecked(&board, Side::Zero, &mut out);
        assert_eq!(out, encode_position(&board, Side::Zero).unwrap());
    }

    #[test]
    fn stale_buffer_is_fully_overwritten() {
        let board = near_finished_race();
        let mut out = [f32::NAN; FEATURE_COUNT];
        extract_features(&board, Side::Zero, &mut out).unwrap();
        assert!(out.iter().all(|x| x.is_finite()));
        assert_eq!(out, encode_position(&board, Side::Zero).unwrap());
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let board = blocked_contact();
        let a = encode_position(&board, Side::Zero).unwrap();
        let b = encode_position(&board, Side::Zero).unwrap();
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn names_are_unique_and_complete() {
        let names = feature_names();
        assert_eq!(names.len(), FEATURE_COUNT);
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
        assert_eq!(feature_name(FEATURE_COUNT), None);
    }

    #[test]
    fn known_names() {
        assert_eq!(feature_name(0).as_deref(), Some("on_roll.point_1.one"));
        assert_eq!(
            feature_name(5 * POINT_CHANNELS + 3).as_deref(),
            Some("on_roll.point_6.spare")
        );
        assert_eq!(
            feature_name(OPPONENT_BASE + BAR * POINT_CHANNELS).as_deref(),
            Some("opponent.bar.one_plus")
        );
        assert_eq!(feature_name(FEAT_PIPS).as_deref(), Some("on_roll.pips"));
        assert_eq!(
            feature_name(OPPONENT_BASE + FEAT_ESCAPES).as_deref(),
            Some("opponent.escapes")
        );
        assert_eq!(feature_name(FEAT_CONTACT).as_deref(), Some("shared.contact"));
        assert_eq!(
            feature_name(FEAT_CLASS + PositionClass::Race.index()).as_deref(),
            Some("shared.class.race")
        );
    }
}
