//! Property tests for the valuation engine

use proptest::prelude::*;
use std::collections::BTreeMap;
use valuation_engine::future_picks::discount_factor;
use valuation_engine::merge::GravityPatch;
use valuation_engine::pick_table::TOTAL_PICKS;
use valuation_engine::settings::FuturePickSettings;
use valuation_engine::{
    age_multiplier, compute_player_value, dev_trait_multiplier, gravity, merge_settings, nearest_pick,
    position_multiplier, value_at, youth_buffer, DevTrait, PlayerAttributes, Position, Settings, SettingsPatch,
};

fn any_position() -> impl Strategy<Value = Position> {
    prop::sample::select(Position::ALL.to_vec())
}

fn any_dev_trait() -> impl Strategy<Value = DevTrait> {
    prop::sample::select(vec![DevTrait::Normal, DevTrait::Star, DevTrait::Superstar, DevTrait::XFactor])
}

fn any_patch() -> impl Strategy<Value = SettingsPatch> {
    (
        prop::option::of(0.0f64..3.0),
        prop::option::of(prop::collection::btree_map(any_position(), -1.0f64..1.0, 0..6)),
        prop::option::of((1000.0f64..9000.0, 9000.0f64..30000.0)),
    )
        .prop_map(|(spread, offsets, cap)| SettingsPatch {
            pos_spread_scalar: spread,
            pos_offsets: offsets,
            gravity: cap.map(|(threshold, vmax)| GravityPatch {
                enabled: Some(true),
                threshold: Some(threshold),
                vmax: Some(vmax),
            }),
            ..SettingsPatch::default()
        })
}

proptest! {
    /// Property: the chart never increases from one pick to the next
    #[test]
    fn prop_chart_non_increasing(pick in -50i64..300) {
        prop_assert!(value_at(pick + 1) <= value_at(pick));
        prop_assert!(value_at(pick) >= 2.0);
    }

    /// Property: every chart value finds itself, or an earlier pick worth the same
    #[test]
    fn prop_nearest_pick_round_trip(pick in 1u32..=TOTAL_PICKS) {
        let found = nearest_pick(value_at(pick as i64));
        prop_assert_eq!(found.table_value, value_at(pick as i64));
        prop_assert!(found.pick <= pick);
    }

    /// Property: multipliers are never negative, whatever the inputs
    #[test]
    fn prop_multipliers_non_negative(
        pos in any_position(),
        dev in any_dev_trait(),
        age in -10i32..80,
        patch in any_patch(),
    ) {
        let settings = merge_settings(&Settings::default(), &patch);
        prop_assert!(position_multiplier(pos, &settings) >= 0.0);
        prop_assert!(age_multiplier(age, pos, &settings) >= 0.0);
        prop_assert!(youth_buffer(pos, age, &settings) >= 0.0);
        prop_assert!(dev_trait_multiplier(pos, age, dev, &settings) >= 0.0);
    }

    /// Property: with decay on, age never helps past 29
    #[test]
    fn prop_age_non_increasing_after_anchor(pos in any_position(), age in 29i32..40) {
        let settings = Settings::default();
        prop_assert!(age_multiplier(age + 1, pos, &settings) <= age_multiplier(age, pos, &settings));
    }

    /// Property: relief and longevity overrides never let age help past the decay anchor
    #[test]
    fn prop_age_non_increasing_with_relief(
        pos in any_position(),
        relief in 0.0f64..=1.0,
        start in 20u32..36,
        floor in 30u32..=40,
        ratio in 0.5f64..=1.0,
        offset in 0i32..20,
    ) {
        let mut settings = Settings::default();
        settings.age.penalty_relief_over28 = relief;
        settings.age.decay.ratio = ratio;
        settings.age.longevity.decay_start_age.insert(pos, start);
        settings.age.longevity.floor_age.insert(pos, floor);
        prop_assert!(settings.validate().is_ok());
        let age = (start as i32 + offset).min(39);
        prop_assert!(age_multiplier(age + 1, pos, &settings) <= age_multiplier(age, pos, &settings));
    }

    /// Property: the soft cap keeps values above the threshold inside (threshold, vmax]
    #[test]
    fn prop_gravity_bounds(value in 0.0f64..1.0e6, threshold in 100.0f64..8000.0, headroom in 1.0f64..20000.0) {
        let vmax = threshold + headroom;
        let capped = gravity(value, threshold, vmax);
        if value <= threshold {
            prop_assert_eq!(capped, value);
        } else {
            prop_assert!(capped > threshold && capped <= vmax);
            prop_assert!(capped <= value);
        }
    }

    /// Property: the current draft is never discounted
    #[test]
    fn prop_current_draft_undiscounted(round in 1u32..=7, factor in 0.0f64..2.0) {
        let mut future = FuturePickSettings::default();
        future.schedule.insert(round, BTreeMap::from([(0, factor), (1, factor)]));
        prop_assert_eq!(discount_factor(round, 0, &future), 1.0);
    }

    /// Property: an empty patch changes nothing and a patch applied twice equals it applied once
    #[test]
    fn prop_merge_identity_and_idempotence(patch in any_patch()) {
        let base = Settings::default();
        prop_assert_eq!(&merge_settings(&base, &SettingsPatch::default()), &base);
        let once = merge_settings(&base, &patch);
        let twice = merge_settings(&once, &patch);
        prop_assert_eq!(once, twice);
    }

    /// Property: player values are finite and non-negative
    #[test]
    fn prop_player_value_non_negative(
        overall in 0i32..120,
        age in 15i32..50,
        pos in any_position(),
        dev in any_dev_trait(),
    ) {
        let result = compute_player_value(&PlayerAttributes::new(overall, age, pos, dev), &Settings::default());
        prop_assert!(result.value.is_finite());
        prop_assert!(result.value >= 0.0);
        prop_assert!(result.value <= 18000.0);
    }
}
