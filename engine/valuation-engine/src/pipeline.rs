//! Player valuation pipeline
//!
//! V = Anchor(ovr) / PosMult(QB) × PosMult(pos) × AgeMult × YouthBuffer × DevTraitMult
//!     × physical multipliers, then the soft cap, then clamped at zero.
//!
//! The soft cap runs once, after every multiplier.

use crate::anchor::anchor_value;
use crate::gravity::gravity;
use crate::multipliers::{age_multiplier, dev_trait_multiplier, position_multiplier, youth_buffer};
use crate::physical::{ability_slot_multiplier, physical_multiplier, PhysicalKind};
use crate::pick_table::nearest_pick;
use crate::settings::Settings;
use crate::types::{PlayerAttributes, Position, ValuationResult, ValuationTrace};
use tracing::debug;

/// Physical factors that apply to a player, `None` where no rating was given
struct PhysicalFactors {
    speed: Option<f64>,
    throw_power: Option<f64>,
    height: Option<f64>,
    ability_slot: Option<f64>,
}

impl PhysicalFactors {
    fn product(&self) -> f64 {
        [self.speed, self.throw_power, self.height, self.ability_slot].iter().flatten().product()
    }
}

fn physical_factors(attrs: &PlayerAttributes, settings: &Settings) -> PhysicalFactors {
    let physical = &attrs.physical;
    let rated = |kind: PhysicalKind, rating: Option<i32>| {
        rating.map(|r| physical_multiplier(kind, attrs.position, r as f64, settings))
    };
    PhysicalFactors {
        speed: rated(PhysicalKind::Speed, physical.speed),
        throw_power: rated(PhysicalKind::ThrowPower, physical.throw_power),
        height: rated(PhysicalKind::Height, physical.height_in),
        ability_slot: physical
            .ability_slots
            .map(|slots| ability_slot_multiplier(slots, attrs.age, attrs.dev_trait, settings)),
    }
}

/// Value a player against a settings snapshot
pub fn compute_player_value(attrs: &PlayerAttributes, settings: &Settings) -> ValuationResult {
    let anchor = anchor_value(attrs.overall, settings);
    let reference_multiplier = position_multiplier(Position::REFERENCE, settings);
    let base_value = if reference_multiplier > 0.0 { anchor / reference_multiplier } else { 0.0 };

    let position = position_multiplier(attrs.position, settings);
    let age = age_multiplier(attrs.age, attrs.position, settings);
    let youth = youth_buffer(attrs.position, attrs.age, settings);
    let dev_trait = dev_trait_multiplier(attrs.position, attrs.age, attrs.dev_trait, settings);
    let physical = physical_factors(attrs, settings);

    let composed_value = base_value * position * age * youth * dev_trait * physical.product();

    let cap = settings.effective_gravity();
    let (capped, applied) = if cap.enabled {
        (gravity(composed_value, cap.threshold, cap.vmax), Some(cap))
    } else {
        (composed_value, None)
    };
    let value = if capped.is_nan() { 0.0 } else { capped.max(0.0) };

    debug!(
        position = %attrs.position,
        overall = attrs.overall,
        age = attrs.age,
        dev_trait = %attrs.dev_trait,
        anchor,
        composed_value,
        value,
        "player valued"
    );

    ValuationResult {
        value,
        nearest_pick: nearest_pick(value),
        trace: ValuationTrace {
            anchor_value: anchor,
            reference_multiplier,
            base_value,
            position,
            age,
            youth,
            dev_trait,
            speed: physical.speed,
            throw_power: physical.throw_power,
            height: physical.height,
            ability_slot: physical.ability_slot,
            composed_value,
            gravity: applied,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GravitySettings;
    use crate::types::{DevTrait, PhysicalAttributes};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_reference_position_at_prime() {
        let settings = Settings::default();
        // age 28 Normal QB: youth 1.0, dev 1.0, age 0.75
        let result = compute_player_value(&PlayerAttributes::new(99, 28, Position::QB, DevTrait::Normal), &settings);
        let t = &result.trace;
        assert!(close(t.anchor_value, 6000.0));
        assert!(close(t.reference_multiplier, 2.5));
        assert!(close(t.base_value, 2400.0));
        assert!(close(t.position, 2.5));
        assert!(close(t.age, 0.75));
        assert_eq!(t.youth, 1.0);
        assert_eq!(t.dev_trait, 1.0);
        assert!(close(t.composed_value, 4500.0));
        // below the soft cap threshold
        assert!(close(result.value, 4500.0));
        assert_eq!(result.nearest_pick.pick, 1);
    }

    #[test]
    fn test_trace_multiplies_out_to_composed_value() {
        let settings = Settings::default();
        let attrs = PlayerAttributes::new(88, 24, Position::WR, DevTrait::Superstar).with_physical(PhysicalAttributes {
            speed: Some(95),
            throw_power: None,
            height_in: Some(74),
            ability_slots: Some(2),
        });
        let result = compute_player_value(&attrs, &settings);
        let t = &result.trace;
        let product = t.base_value
            * t.position
            * t.age
            * t.youth
            * t.dev_trait
            * t.speed.unwrap()
            * t.height.unwrap()
            * t.ability_slot.unwrap();
        assert!(close(t.composed_value, product));
        assert!(t.throw_power.is_none());
        assert!(t.speed.unwrap() > 1.0);
    }

    #[test]
    fn test_gravity_applied_last() {
        let settings = Settings::default();
        let result = compute_player_value(&PlayerAttributes::new(99, 21, Position::QB, DevTrait::XFactor), &settings);
        let t = &result.trace;
        assert!(t.composed_value > 6000.0);
        let cap = t.gravity.unwrap();
        assert!(close(result.value, gravity(t.composed_value, cap.threshold, cap.vmax)));
        assert!(result.value <= cap.vmax);
        assert!(result.value < t.composed_value);
    }

    #[test]
    fn test_gravity_disabled_keeps_composed_value() {
        let mut settings = Settings::default();
        settings.gravity = Some(GravitySettings { enabled: false, ..GravitySettings::default() });
        let result = compute_player_value(&PlayerAttributes::new(99, 21, Position::QB, DevTrait::XFactor), &settings);
        assert!(result.trace.gravity.is_none());
        assert_eq!(result.value, result.trace.composed_value);
    }

    #[test]
    fn test_absent_gravity_block_uses_default_cap() {
        let mut settings = Settings::default();
        settings.gravity = None;
        let result = compute_player_value(&PlayerAttributes::new(99, 21, Position::QB, DevTrait::XFactor), &settings);
        assert_eq!(result.trace.gravity, Some(GravitySettings::default()));
    }

    #[test]
    fn test_floored_age_values_at_zero() {
        let settings = Settings::default();
        let result = compute_player_value(&PlayerAttributes::new(90, 36, Position::WR, DevTrait::Star), &settings);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.nearest_pick.table_value, 2.0);
    }

    #[test]
    fn test_younger_is_worth_more() {
        let settings = Settings::default();
        let young = compute_player_value(&PlayerAttributes::new(80, 22, Position::CB, DevTrait::Star), &settings);
        let old = compute_player_value(&PlayerAttributes::new(80, 31, Position::CB, DevTrait::Star), &settings);
        assert!(young.value > old.value);
    }
}
