//! Draft pick value table
//!
//! Classic trade-value chart: a fixed first round (3000 down to 590) followed
//! by banded decrements for picks 33..=224. Values never fall below
//! [`PICK_VALUE_FLOOR`], so the table is non-increasing and the late rounds
//! share the floor value.

use serde::{Deserialize, Serialize};

pub const PICKS_PER_ROUND: u32 = 32;
pub const DRAFT_ROUNDS: u32 = 7;
pub const TOTAL_PICKS: u32 = PICKS_PER_ROUND * DRAFT_ROUNDS;

/// Lowest value any pick can carry
pub const PICK_VALUE_FLOOR: i32 = 2;

const FIRST_ROUND: [i32; 32] = [
    3000, 2600, 2200, 1800, 1700, 1600, 1500, 1400, 1350, 1300, 1250, 1200, 1150, 1100, 1050,
    1000, 950, 900, 875, 850, 800, 780, 760, 740, 720, 700, 680, 660, 640, 620, 600, 590,
];

/// Per-pick decrement for picks after the first round
const fn step_for(pick: u32) -> i32 {
    match pick {
        33..=60 => 10,
        61..=64 => 8,
        65..=96 => 5,
        97..=108 => 4,
        109..=128 => 3,
        129..=160 => 2,
        _ => 1,
    }
}

const fn build_table() -> [i32; TOTAL_PICKS as usize] {
    let mut table = [0i32; TOTAL_PICKS as usize];
    let mut i = 0;
    while i < FIRST_ROUND.len() {
        table[i] = FIRST_ROUND[i];
        i += 1;
    }
    let mut running = FIRST_ROUND[31];
    let mut pick = PICKS_PER_ROUND + 1;
    while pick <= TOTAL_PICKS {
        running -= step_for(pick);
        table[(pick - 1) as usize] = if running < PICK_VALUE_FLOOR { PICK_VALUE_FLOOR } else { running };
        pick += 1;
    }
    table
}

/// First pick carrying the floor value
pub const FIRST_FLOORED_PICK: u32 = 132;

static PICK_VALUES: [i32; TOTAL_PICKS as usize] = build_table();

/// Closest table entry to a value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestPick {
    /// Overall pick number, 1..=224
    pub pick: u32,
    /// Round, 1..=7
    pub round: u32,
    /// Pick within the round, 1..=32
    pub pick_in_round: u32,
    /// Table value at `pick`
    pub table_value: f64,
}

/// One row of the chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickChartRow {
    pub pick: u32,
    pub round: u32,
    pub pick_in_round: u32,
    pub value: f64,
}

/// Clamp any integer into the valid pick range
pub fn clamp_pick(pick: i64) -> u32 {
    pick.clamp(1, TOTAL_PICKS as i64) as u32
}

/// Round containing an overall pick
pub fn round_of(pick: u32) -> u32 {
    (pick - 1) / PICKS_PER_ROUND + 1
}

/// Position of an overall pick within its round
pub fn pick_in_round(pick: u32) -> u32 {
    (pick - 1) % PICKS_PER_ROUND + 1
}

/// First and last overall pick of a round; the round is clamped to 1..=7
pub fn round_range(round: u32) -> (u32, u32) {
    let r = round.clamp(1, DRAFT_ROUNDS);
    ((r - 1) * PICKS_PER_ROUND + 1, r * PICKS_PER_ROUND)
}

/// Table value for a pick; out-of-range picks clamp to 1 or 224
pub fn value_at(pick: i64) -> f64 {
    PICK_VALUES[(clamp_pick(pick) - 1) as usize] as f64
}

/// Pick whose table value is closest to `value`.
///
/// Scans 1..=224 in order and keeps the first minimum, so exact ties resolve
/// to the earlier, more valuable pick.
pub fn nearest_pick(value: f64) -> NearestPick {
    let mut best_pick = TOTAL_PICKS;
    let mut best_diff = f64::INFINITY;
    for pick in 1..=TOTAL_PICKS {
        let diff = (value_at(pick as i64) - value).abs();
        if diff < best_diff {
            best_diff = diff;
            best_pick = pick;
        }
    }
    NearestPick {
        pick: best_pick,
        round: round_of(best_pick),
        pick_in_round: pick_in_round(best_pick),
        table_value: value_at(best_pick as i64),
    }
}

/// The full chart, pick 1 first
pub fn pick_chart() -> Vec<PickChartRow> {
    (1..=TOTAL_PICKS)
        .map(|pick| PickChartRow {
            pick,
            round: round_of(pick),
            pick_in_round: pick_in_round(pick),
            value: value_at(pick as i64),
        })
        .collect()
}
