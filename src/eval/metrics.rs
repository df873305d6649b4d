//! Per-side positional metrics.
//!
//! Each metric is a raw count computed from one side's slot array, with the
//! opponent's array consulted only where the concept involves both sides
//! (contact breaking, escapes, containment). All functions work on the
//! fixed-size slot arrays and never allocate.

use serde::Serialize;

use super::escapes::escapes;
use crate::board::state::{Board, BAR, BAR_PIPS, NUM_POINTS, NUM_SLOTS};
use crate::board::Side;

/// Slots making up a side's home board.
const HOME: std::ops::Range<usize> = 0..6;

/// Slots between the two home boards.
const OUTFIELD: std::ops::Range<usize> = 6..18;

/// Slots making up the opponent's home board.
const OPP_HOME: std::ops::Range<usize> = 18..24;

/// Slots from which a checker can make a new home-board or bar point.
const BUILDER_ZONE: std::ops::RangeInclusive<usize> = 3..=10;

/// Opponent slots probed when measuring containment.
const CONTAINMENT_PROBE: std::ops::RangeInclusive<usize> = 15..=24;

/// Number of scalar concepts measured per side.
pub const NUM_CONCEPTS: usize = 17;

/// Concept names, in the order `SideMetrics::concepts` returns them.
pub const CONCEPT_NAMES: [&str; NUM_CONCEPTS] = [
    "bar",
    "off",
    "pips",
    "blots",
    "made_points",
    "home_points",
    "home_blots",
    "anchors",
    "back_checker",
    "prime",
    "home_checkers",
    "outfield_checkers",
    "opp_home_checkers",
    "break_contact",
    "escapes",
    "containment",
    "builders",
];

/// Raw positional counts for one side of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SideMetrics {
    pub bar: u32,
    pub off: u32,
    pub pips: u32,
    pub blots: u32,
    pub made_points: u32,
    pub home_points: u32,
    pub home_blots: u32,
    pub anchors: u32,
    /// 1-based slot of the rearmost checker; 25 for the bar, 0 if none.
    pub back_checker: u32,
    pub prime: u32,
    pub home_checkers: u32,
    pub outfield_checkers: u32,
    pub opp_home_checkers: u32,
    pub break_contact: u32,
    pub escapes: u32,
    pub containment: u32,
    /// Checkers on the 4- through 11-points.
    pub builders: u32,
}

impl SideMetrics {
    /// Measures `side` of `board`.
    pub fn measure(board: &Board, side: Side) -> Self {
        let own = board.side(side);
        let opp = board.side(side.opponent());
        SideMetrics {
            bar: own[BAR] as u32,
            off: board.off[side.index()] as u32,
            pips: pip_count(own),
            blots: count_points(own, 0..NUM_POINTS, |c| c == 1),
            made_points: count_points(own, 0..NUM_POINTS, |c| c >= 2),
            home_points: count_points(own, HOME, |c| c >= 2),
            home_blots: count_points(own, HOME, |c| c == 1),
            anchors: count_points(own, OPP_HOME, |c| c >= 2),
            back_checker: back_checker(own).map_or(0, |i| i as u32 + 1),
            prime: longest_prime(own),
            home_checkers: sum_checkers(own, HOME),
            outfield_checkers: sum_checkers(own, OUTFIELD),
            opp_home_checkers: sum_checkers(own, OPP_HOME),
            break_contact: break_contact(own, opp),
            escapes: back_escapes(own, opp),
            containment: containment(own),
            builders: own[BUILDER_ZONE].iter().map(|&c| c as u32).sum(),
        }
    }

    /// Returns every concept in `CONCEPT_NAMES` order.
    pub fn concepts(&self) -> [u32; NUM_CONCEPTS] {
        [
            self.bar,
            self.off,
            self.pips,
            self.blots,
            self.made_points,
            self.home_points,
            self.home_blots,
            self.anchors,
            self.back_checker,
            self.prime,
            self.home_checkers,
            self.outfield_checkers,
            self.opp_home_checkers,
            self.break_contact,
            self.escapes,
            self.containment,
            self.builders,
        ]
    }
}

/// Total pip distance of a side to bear off completely.
pub fn pip_count(own: &[u8; NUM_SLOTS]) -> u32 {
    let points: u32 = own[..NUM_POINTS]
        .iter()
        .enumerate()
        .map(|(i, &c)| c as u32 * (i as u32 + 1))
        .sum();
    points + own[BAR] as u32 * BAR_PIPS
}

/// Slot index of the rearmost checker (bar = 24), or None if the side has
/// nothing left on the board.
pub fn back_checker(own: &[u8; NUM_SLOTS]) -> Option<usize> {
    (0..NUM_SLOTS).rev().find(|&i| own[i] > 0)
}

fn count_points<R, F>(own: &[u8; NUM_SLOTS], range: R, pred: F) -> u32
where
    R: IntoIterator<Item = usize>,
    F: Fn(u8) -> bool,
{
    range.into_iter().filter(|&i| pred(own[i])).count() as u32
}

fn sum_checkers(own: &[u8; NUM_SLOTS], range: std::ops::Range<usize>) -> u32 {
    own[range].iter().map(|&c| c as u32).sum()
}

/// Longest run of consecutive made points.
fn longest_prime(own: &[u8; NUM_SLOTS]) -> u32 {
    let mut best = 0;
    let mut run = 0;
    for &c in &own[..NUM_POINTS] {
        if c >= 2 {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// Pips this side still has to move to get every checker past the
/// opponent's rearmost checker.
fn break_contact(own: &[u8; NUM_SLOTS], opp: &[u8; NUM_SLOTS]) -> u32 {
    let Some(opp_back) = back_checker(opp) else {
        return 0;
    };
    // The opponent's rearmost checker, in our numbering. The bar maps to -1.
    let pivot = NUM_POINTS as i32 - 1 - opp_back as i32;
    let mut pips = 0u32;
    for (i, &count) in own.iter().enumerate() {
        let slot = i as i32;
        if slot > pivot {
            pips += (slot + 1 - pivot) as u32 * count as u32;
        }
    }
    pips
}

/// Rolls that let the opponent's rearmost checker run past this side.
fn back_escapes(own: &[u8; NUM_SLOTS], opp: &[u8; NUM_SLOTS]) -> u32 {
    match back_checker(opp) {
        Some(from) => escapes(own, from) as u32,
        None => 36,
    }
}

/// How well this side hems in an opposing checker deep in its territory:
/// the rolls out of 36 that fail to escape from the worst opponent slot in
/// 15..=24.
fn containment(own: &[u8; NUM_SLOTS]) -> u32 {
    let fewest = CONTAINMENT_PROBE
        .map(|from| escapes(own, from))
        .min()
        .unwrap_or(36);
    36 - fewest as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(a: [(usize, u8); 8], b: [(usize, u8); 8]) -> Board {
        let mut checkers = [[0u8; NUM_SLOTS]; 2];
        for (slot, count) in a {
            checkers[0][slot] += count;
        }
        for (slot, count) in b {
            checkers[1][slot] += count;
        }
        Board::from_counts(checkers).expect("test board must be valid")
    }

    #[test]
    fn starting_position_metrics() {
        let board = Board::starting();
        for side in [Side::Zero, Side::One] {
            let m = SideMetrics::measure(&board, side);
            assert_eq!(m.pips, 167);
            assert_eq!(m.blots, 0);
            assert_eq!(m.made_points, 4);
            assert_eq!(m.home_points, 1);
            assert_eq!(m.home_blots, 0);
            assert_eq!(m.anchors, 1);
            assert_eq!(m.back_checker, 24);
            assert_eq!(m.prime, 1);
            assert_eq!(m.home_checkers, 5);
            assert_eq!(m.outfield_checkers, 8);
            assert_eq!(m.opp_home_checkers, 2);
            assert_eq!(m.bar, 0);
            assert_eq!(m.off, 0);
            assert_eq!(m.break_contact, 167);
            assert_eq!(m.escapes, 24);
            assert_eq!(m.containment, 14);
            assert_eq!(m.builders, 8);
        }
    }

    #[test]
    fn near_finished_race_metrics() {
        // Side 0: 3 on the ace, 2 on the deuce, 1 on the 3-point, 9 off.
        // Side 1: 2 on the ace, 1 on the 4-point, 12 off.
        let board = board_from(
            [(0, 3), (1, 2), (2, 1), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0)],
            [(0, 2), (3, 1), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0)],
        );
        let a = SideMetrics::measure(&board, Side::Zero);
        let b = SideMetrics::measure(&board, Side::One);
        assert_eq!(a.pips, 10);
        assert_eq!(b.pips, 6);
        assert_eq!(a.off, 9);
        assert_eq!(b.off, 12);
        assert_eq!(a.blots, 1);
        assert_eq!(a.made_points, 2);
        assert_eq!(a.back_checker, 3);
        assert_eq!(b.back_checker, 4);
        assert_eq!(a.break_contact, 0);
        assert_eq!(a.escapes, 36);
        assert_eq!(a.builders, 0);
    }

    #[test]
    fn blocked_contact_metrics() {
        // Side 0 holds a full prime from its 3-point to its 8-point plus
        // three checkers on its 13-point; side 1 is still at home with two
        // checkers trapped behind the prime.
        let board = board_from(
            [(2, 2), (3, 2), (4, 2), (5, 2), (6, 2), (7, 2), (12, 3), (0, 0)],
            [(23, 2), (5, 5), (7, 3), (12, 5), (0, 0), (0, 0), (0, 0), (0, 0)],
        );
        let a = SideMetrics::measure(&board, Side::Zero);
        let b = SideMetrics::measure(&board, Side::One);
        assert_eq!(a.pips, 105);
        assert_eq!(b.pips, 167);
        assert_eq!(a.prime, 6);
        assert_eq!(a.made_points, 7);
        assert_eq!(a.home_points, 4);
        assert_eq!(a.escapes, 0);
        assert_eq!(a.containment, 36);
        assert_eq!(b.escapes, 34);
        assert_eq!(b.break_contact, 36);
        assert_eq!(a.builders, 10);
        assert_eq!(b.builders, 8);
    }

    #[test]
    fn bar_checker_counts_twenty_five_pips() {
        let mut board = Board::starting();
        board.checkers[0][23] = 1;
        board.checkers[0][BAR] = 1;
        let m = SideMetrics::measure(&board, Side::Zero);
        assert_eq!(m.pips, 168);
        assert_eq!(m.bar, 1);
        assert_eq!(m.back_checker, 25);
        assert_eq!(m.blots, 1);
        assert_eq!(m.anchors, 0);
    }

    #[test]
    fn empty_side_has_no_back_checker() {
        let own = [0u8; NUM_SLOTS];
        assert_eq!(back_checker(&own), None);
        assert_eq!(pip_count(&own), 0);
    }
}
