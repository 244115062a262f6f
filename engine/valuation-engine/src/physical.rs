//! Physical trait multipliers: speed, throw power, height and ability slots

use crate::settings::{AbilitySlotSettings, PhysicalSettings, Settings};
use crate::types::{DevTrait, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which physical factor to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicalKind {
    Speed,
    ThrowPower,
    Height,
    /// Ability slots depend on the player's age and trait as well as the count
    AbilitySlot { age: i32, dev_trait: DevTrait },
}

/// Capped linear curve around a pivot.
///
/// Above the pivot each step earns `cap_up / steps_up` up to `cap_up`; below
/// it each step costs `cap_down / steps_down` up to
/// `cap_down = cap_down_scale * cap_up`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCurve {
    pub pivot: f64,
    pub cap_up: f64,
    pub cap_down_scale: f64,
    pub steps_up: f64,
    pub steps_down: f64,
}

fn capped(distance: f64, cap: f64, steps: f64) -> f64 {
    if steps <= 0.0 {
        return cap;
    }
    cap.min(distance * (cap / steps))
}

impl StepCurve {
    pub fn multiplier(&self, value: f64) -> f64 {
        if value >= self.pivot {
            1.0 + capped(value - self.pivot, self.cap_up, self.steps_up)
        } else {
            let cap_down = self.cap_down_scale * self.cap_up;
            (1.0 - capped(self.pivot - value, cap_down, self.steps_down)).max(0.0)
        }
    }
}

fn physical(settings: &Settings) -> Option<&PhysicalSettings> {
    settings.physical.as_ref()
}

fn lookup(map: &BTreeMap<Position, f64>, position: Position, fallback: f64) -> f64 {
    map.get(&position).copied().unwrap_or(fallback)
}

/// Speed curve for a position, if speed matters there
pub fn speed_curve(position: Position, settings: &Settings) -> Option<StepCurve> {
    let speed = physical(settings)?.speed.as_ref().filter(|s| s.enabled)?;
    let pivot = speed.pivot.get(&position).copied()?;
    Some(StepCurve {
        pivot,
        cap_up: lookup(&speed.cap_up, position, 0.0),
        cap_down_scale: speed.cap_down_scale,
        steps_up: lookup(&speed.steps_up, position, 1.0),
        steps_down: lookup(&speed.steps_down, position, 1.0),
    })
}

/// Throw power curve; only quarterbacks have one
pub fn throw_power_curve(position: Position, settings: &Settings) -> Option<StepCurve> {
    if position != Position::QB {
        return None;
    }
    let thp = physical(settings)?.throw_power.as_ref().filter(|t| t.enabled)?;
    Some(StepCurve {
        pivot: thp.pivot,
        cap_up: thp.cap_up,
        cap_down_scale: thp.cap_down_scale,
        steps_up: thp.steps_up,
        steps_down: thp.steps_down,
    })
}

/// Height curve for a position with a baseline height
pub fn height_curve(position: Position, settings: &Settings) -> Option<StepCurve> {
    let height = physical(settings)?.height.as_ref().filter(|h| h.enabled)?;
    let baseline = height.baselines_in.get(&position).copied()?;
    Some(StepCurve {
        pivot: baseline,
        cap_up: lookup(&height.cap_up, position, 0.0),
        cap_down_scale: height.cap_down_scale,
        steps_up: height.inches_to_cap,
        steps_down: height.inches_to_cap,
    })
}

fn ability_slot_settings(settings: &Settings) -> Option<&AbilitySlotSettings> {
    physical(settings)?.ability_slots.as_ref().filter(|a| a.enabled)
}

/// Value of the highest key at or below `at`
fn band_at<V: Copy>(table: &BTreeMap<u32, V>, at: u32) -> Option<V> {
    table.range(..=at).next_back().map(|(_, v)| *v)
}

/// Ability-slot multiplier.
///
/// Normal and Star players get exactly 1.0. Superstar and X-Factor players
/// take the threshold multiplier for their slot count, and only the bonus
/// above 1.0 is tapered by the age band.
pub fn ability_slot_multiplier(slots: u32, age: i32, dev_trait: DevTrait, settings: &Settings) -> f64 {
    if !dev_trait.has_ability_slots() {
        return 1.0;
    }
    let Some(config) = ability_slot_settings(settings) else {
        return 1.0;
    };
    let threshold = band_at(&config.thresholds, slots).unwrap_or(1.0);
    let taper = band_at(&config.age_band, age.max(0) as u32).unwrap_or(1.0);
    (1.0 + (threshold - 1.0) * taper).max(0.0)
}

/// Multiplier for one physical factor; positions the factor does not apply to get 1.0
pub fn physical_multiplier(kind: PhysicalKind, position: Position, rating: f64, settings: &Settings) -> f64 {
    let curve = match kind {
        PhysicalKind::Speed => speed_curve(position, settings),
        PhysicalKind::ThrowPower => throw_power_curve(position, settings),
        PhysicalKind::Height => height_curve(position, settings),
        PhysicalKind::AbilitySlot { age, dev_trait } => {
            let slots = rating.max(0.0).floor() as u32;
            return ability_slot_multiplier(slots, age, dev_trait, settings);
        }
    };
    curve.map_or(1.0, |c| c.multiplier(rating))
}
