//! Future draft pick valuation

use crate::error::{Result, ValuationError};
use crate::pick_table::{nearest_pick, round_range, value_at, NearestPick};
use crate::settings::{BaselineStrategy, FuturePickSettings, Settings};
use crate::types::PickDescriptor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Discount for a pick one draft away when the schedule has no entry
pub const FALLBACK_ONE_YEAR_FACTOR: f64 = 0.85;
/// Discount for a pick two drafts away when the schedule has no entry
pub const FALLBACK_TWO_YEAR_FACTOR: f64 = 0.70;

/// Value of a pick, with the pieces it was built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuturePickValue {
    pub points: f64,
    pub baseline_pick: u32,
    pub factor: f64,
    pub base_points: f64,
}

/// Pick valuation plus the current pick it is worth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickValuation {
    pub descriptor: PickDescriptor,
    pub value: FuturePickValue,
    pub nearest_pick: NearestPick,
}

/// Pick whose table value stands in for a whole round
pub fn baseline_pick(round: u32, future: &FuturePickSettings, projected_pick: Option<i32>) -> u32 {
    let (start, end) = round_range(round);
    if future.baseline == BaselineStrategy::Projected {
        if let Some(projected) = projected_pick {
            return (projected.max(0) as u32).clamp(start, end);
        }
    }
    match future.mid_round_picks.get(&round) {
        Some(anchor) => (*anchor).clamp(start, end),
        None => (start + end) / 2,
    }
}

/// Discount for a round and number of years out; the current draft is undiscounted
pub fn discount_factor(round: u32, years_out: u32, future: &FuturePickSettings) -> f64 {
    if years_out == 0 {
        return 1.0;
    }
    let configured = future
        .schedule
        .get(&round)
        .and_then(|row| row.get(&years_out))
        .copied()
        .filter(|f| *f > 0.0);
    configured.unwrap_or(if years_out == 1 { FALLBACK_ONE_YEAR_FACTOR } else { FALLBACK_TWO_YEAR_FACTOR })
}

/// Value a pick `years_out` drafts ahead in `round`.
///
/// Rounds outside 1..=7 and years outside 0..=2 are rejected. Settings
/// without a `future_picks` block value picks at the round midpoint with the
/// fallback discounts.
pub fn compute_future_pick_value(
    round: i64,
    years_out: i64,
    settings: &Settings,
    projected_pick: Option<i32>,
) -> Result<FuturePickValue> {
    let descriptor = PickDescriptor::new(round, years_out, projected_pick)?;
    let fallback = FuturePickSettings::default();
    let future = settings.future_picks.as_ref().unwrap_or(&fallback);

    let baseline = baseline_pick(descriptor.round, future, descriptor.projected_pick);
    let base_points = value_at(baseline as i64);
    let factor = discount_factor(descriptor.round, descriptor.years_out, future);

    debug!(
        round = descriptor.round,
        years_out = descriptor.years_out,
        baseline,
        factor,
        "future pick valued"
    );

    Ok(FuturePickValue { points: base_points * factor, baseline_pick: baseline, factor, base_points })
}

/// Value a pick and report its current-pick equivalent.
///
/// Refuses when the settings switch future picks off.
pub fn value_pick(descriptor: &PickDescriptor, settings: &Settings) -> Result<PickValuation> {
    let enabled = settings.future_picks.as_ref().is_some_and(|f| f.enabled);
    if !enabled {
        return Err(ValuationError::FeatureDisabled("future_picks"));
    }
    let value = compute_future_pick_value(
        descriptor.round as i64,
        descriptor.years_out as i64,
        settings,
        descriptor.projected_pick,
    )?;
    Ok(PickValuation { descriptor: *descriptor, value, nearest_pick: nearest_pick(value.points) })
}
