//! Position, age, youth and development-trait multipliers
//!
//! Every function here is total: ages are clamped into the calibrated range,
//! missing table entries fall back to neutral defaults, and results are never
//! negative.

use crate::settings::{AgeSettings, Settings, TraitWeights};
use crate::types::{DevTrait, Position};

pub const MIN_AGE: i32 = 20;
pub const MAX_AGE: i32 = 40;
/// Last age with a youth band entry
pub const YOUTH_MAX_AGE: i32 = 28;

/// `1 + pos_spread_scalar * offset`; unknown positions use offset 0
pub fn position_multiplier(position: Position, settings: &Settings) -> f64 {
    let offset = settings.pos_offsets.get(&position).copied().unwrap_or(0.0);
    (1.0 + settings.pos_spread_scalar * offset).max(0.0)
}

fn cliff(age: u32, age_settings: &AgeSettings) -> f64 {
    match age {
        25..=27 => age_settings.cliff_25_27,
        a if a >= 28 => age_settings.cliff_28_plus,
        _ => 1.0,
    }
}

/// Gain around 1.0, then the cliff for the age band
fn scheduled(age: u32, age_settings: &AgeSettings) -> f64 {
    let base = age_settings.base_schedule.get(&age).copied().unwrap_or(1.0);
    (1.0 + age_settings.gain * (base - 1.0)) * cliff(age, age_settings)
}

/// Age at which geometric decay takes over for a position
pub fn decay_start_age(position: Position, age_settings: &AgeSettings) -> u32 {
    age_settings
        .longevity
        .decay_start_age
        .get(&position)
        .copied()
        .unwrap_or(age_settings.decay.start_age)
}

/// Age at which a position's value drops to the floor
pub fn floor_age(position: Position, age_settings: &AgeSettings) -> u32 {
    age_settings.longevity.floor_age.get(&position).copied().unwrap_or(age_settings.floor_age)
}

/// Age multiplier.
///
/// 1. `m = 1 + gain * (base_schedule[age] - 1)`
/// 2. cliff: ages 25..=27 and 28+ scale by their cliff factor
/// 3. past the decay start age, `m = m(start) * ratio^(age - start)`
/// 4. over 28, and from the decay start age on, `m += relief * (1 - m)` while `m < 1`
/// 5. at or past the floor age, `m = floor_value`
///
/// Position longevity overrides replace the global decay start and floor ages.
pub fn age_multiplier(age: i32, position: Position, settings: &Settings) -> f64 {
    let age_settings = &settings.age;
    let a = age.clamp(MIN_AGE, MAX_AGE) as u32;

    let mut m = scheduled(a, age_settings);

    let start = decay_start_age(position, age_settings);
    let decaying = age_settings.decay.enabled && a >= start;
    if decaying && a > start {
        m = scheduled(start, age_settings) * age_settings.decay.ratio.powi((a - start) as i32);
    }

    // relief covers the decay anchor too
    if (a > 28 || decaying) && m < 1.0 {
        m += age_settings.penalty_relief_over28 * (1.0 - m);
    }

    if a >= floor_age(position, age_settings) {
        m = age_settings.floor_value;
    }

    m.max(0.0)
}

/// `1 + dmax[position] * band[clamp(age, 20, 28)]`
pub fn youth_buffer(position: Position, age: i32, settings: &Settings) -> f64 {
    let a = age.clamp(MIN_AGE, YOUTH_MAX_AGE) as u32;
    let band = settings.youth_buffer.band.get(&a).copied().unwrap_or(0.0);
    let dmax = settings.youth_buffer.dmax.get(&position).copied().unwrap_or(0.0);
    (1.0 + dmax * band).max(0.0)
}

/// Share of trait experience gains still ahead of a player
pub fn dev_band(age: i32) -> f64 {
    match age {
        a if a <= 21 => 1.00,
        22 => 0.85,
        23 => 0.70,
        24 => 0.50,
        25 => 0.35,
        26 => 0.20,
        27 => 0.10,
        _ => 0.00,
    }
}

/// `1 + dcap * (w_xp * dev_band(age) + w_abil) * trait_score`
pub fn dev_trait_multiplier(position: Position, age: i32, dev_trait: DevTrait, settings: &Settings) -> f64 {
    let dev = &settings.dev_trait;
    let score = dev.trait_scores.get(&dev_trait).copied().unwrap_or(0.0);
    let dcap = dev.dcap.get(&position).copied().unwrap_or(0.0);
    let weights = dev.weights.get(&position).copied().unwrap_or_default();
    let TraitWeights { w_xp, w_abil } = weights;
    (1.0 + dcap * (w_xp * dev_band(age) + w_abil) * score).max(0.0)
}
