//! Escape counting.
//!
//! An opposing checker trying to run past a blockade looks at the 12 points
//! in front of it. For each 12-bit mask of which of those points are made
//! (held by two or more checkers), the table stores how many of the 36 dice
//! rolls carry the checker past them. The table is computed at compile time.

use crate::board::state::NUM_SLOTS;

/// Points in front of a runner that the escape table covers.
const WINDOW: usize = 12;

static ESCAPE_TABLE: [u8; 1 << WINDOW] = build_escape_table();

/// Counts, for every blockade mask, the rolls that get a checker past it.
///
/// A roll `(n0, n1)` with `n1 <= n0` escapes when the landing point of the
/// combined move is open and at least one of the two intermediate points is
/// open. Non-doubles count twice.
const fn build_escape_table() -> [u8; 1 << WINDOW] {
    let mut table = [0u8; 1 << WINDOW];
    let mut mask = 0;
    while mask < table.len() {
        let mut count = 0u8;
        let mut n0 = 0;
        while n0 <= 5 {
            let mut n1 = 0;
            while n1 <= n0 {
                let landing_blocked = mask & (1 << (n0 + n1 + 1)) != 0;
                let both_blocked = mask & (1 << n0) != 0 && mask & (1 << n1) != 0;
                if !landing_blocked && !both_blocked {
                    count += if n0 == n1 { 1 } else { 2 };
                }
                n1 += 1;
            }
            n0 += 1;
        }
        table[mask] = count;
        mask += 1;
    }
    table
}

/// Rolls out of 36 that let an opposing checker escape past `blocker`.
///
/// `from` is the runner's slot in its own numbering (0..=24, 24 being the
/// bar). The runner's next point is slot `23 - (from - 1)` of the blocker's
/// array, so the window reads `blocker[24 + i - from]`.
pub fn escapes(blocker: &[u8; NUM_SLOTS], from: usize) -> u8 {
    debug_assert!(from < NUM_SLOTS);
    let window = from.min(WINDOW);
    let mut mask = 0usize;
    for i in 0..window {
        if blocker[NUM_SLOTS - 1 + i - from] >= 2 {
            mask |= 1 << i;
        }
    }
    ESCAPE_TABLE[mask]
}
