//! Typed settings patches and the recursive merge combinator
//!
//! A patch mirrors the settings tree with every field optional. Merging walks
//! the tree field by field: scalars in the patch replace, maps merge key by
//! key, nested records merge recursively, and absent fields keep the existing
//! value. Applying the same patch twice gives the same tree as applying it
//! once.

use crate::error::{Result, ValuationError};
use crate::settings::*;
use crate::types::{DevTrait, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Merge a partial update into an existing value
pub trait Merge {
    type Patch;

    fn apply(&mut self, patch: &Self::Patch);
}

/// Merge `patch` into a copy of `existing`
pub fn merge_settings(existing: &Settings, patch: &SettingsPatch) -> Settings {
    let mut merged = existing.clone();
    merged.apply(patch);
    merged
}

fn replace<T: Clone>(slot: &mut T, patch: &Option<T>) {
    if let Some(value) = patch {
        *slot = value.clone();
    }
}

fn merge_map<K: Ord + Clone, V: Clone>(map: &mut BTreeMap<K, V>, patch: &Option<BTreeMap<K, V>>) {
    if let Some(entries) = patch {
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
    }
}

fn merge_nested_map<K, V>(map: &mut BTreeMap<K, V>, patch: &Option<BTreeMap<K, V::Patch>>)
where
    K: Ord + Clone,
    V: Merge + Default,
{
    if let Some(entries) = patch {
        for (key, value_patch) in entries {
            map.entry(key.clone()).or_default().apply(value_patch);
        }
    }
}

/// Optional blocks start from their defaults when first patched
fn merge_optional<T: Merge + Default>(slot: &mut Option<T>, patch: &Option<T::Patch>) {
    if let Some(p) = patch {
        slot.get_or_insert_with(T::default).apply(p);
    }
}

impl<V: Clone> Merge for BTreeMap<u32, V> {
    type Patch = BTreeMap<u32, V>;

    fn apply(&mut self, patch: &Self::Patch) {
        for (key, value) in patch {
            self.insert(*key, value.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SettingsPatch {
    pub version: Option<u32>,
    pub pos_spread_scalar: Option<f64>,
    pub pos_offsets: Option<BTreeMap<Position, f64>>,
    pub ovr_curve: Option<OvrCurvePatch>,
    pub age: Option<AgeSettingsPatch>,
    pub youth_buffer: Option<YouthBufferPatch>,
    pub dev_trait: Option<DevTraitPatch>,
    pub physical: Option<PhysicalPatch>,
    pub gravity: Option<GravityPatch>,
    pub future_picks: Option<FuturePickPatch>,
}

impl SettingsPatch {
    /// Parse a patch body, rejecting unknown keys and wrong types
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| ValuationError::invalid_input(format!("settings patch: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Merge for Settings {
    type Patch = SettingsPatch;

    fn apply(&mut self, patch: &SettingsPatch) {
        replace(&mut self.version, &patch.version);
        replace(&mut self.pos_spread_scalar, &patch.pos_spread_scalar);
        merge_map(&mut self.pos_offsets, &patch.pos_offsets);
        if let Some(p) = &patch.ovr_curve {
            self.ovr_curve.apply(p);
        }
        if let Some(p) = &patch.age {
            self.age.apply(p);
        }
        if let Some(p) = &patch.youth_buffer {
            self.youth_buffer.apply(p);
        }
        if let Some(p) = &patch.dev_trait {
            self.dev_trait.apply(p);
        }
        merge_optional(&mut self.physical, &patch.physical);
        merge_optional(&mut self.gravity, &patch.gravity);
        merge_optional(&mut self.future_picks, &patch.future_picks);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OvrCurvePatch {
    pub qb60: Option<f64>,
    pub qb99: Option<f64>,
    pub gamma: Option<f64>,
}

impl Merge for OvrCurve {
    type Patch = OvrCurvePatch;

    fn apply(&mut self, patch: &OvrCurvePatch) {
        replace(&mut self.qb60, &patch.qb60);
        replace(&mut self.qb99, &patch.qb99);
        replace(&mut self.gamma, &patch.gamma);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AgeSettingsPatch {
    pub base_schedule: Option<BTreeMap<u32, f64>>,
    pub cliff_25_27: Option<f64>,
    pub cliff_28_plus: Option<f64>,
    pub gain: Option<f64>,
    pub floor_age: Option<u32>,
    pub floor_value: Option<f64>,
    pub decay: Option<AgeDecayPatch>,
    pub penalty_relief_over28: Option<f64>,
    pub longevity: Option<PositionLongevityPatch>,
}

impl Merge for AgeSettings {
    type Patch = AgeSettingsPatch;

    fn apply(&mut self, patch: &AgeSettingsPatch) {
        merge_map(&mut self.base_schedule, &patch.base_schedule);
        replace(&mut self.cliff_25_27, &patch.cliff_25_27);
        replace(&mut self.cliff_28_plus, &patch.cliff_28_plus);
        replace(&mut self.gain, &patch.gain);
        replace(&mut self.floor_age, &patch.floor_age);
        replace(&mut self.floor_value, &patch.floor_value);
        if let Some(p) = &patch.decay {
            self.decay.apply(p);
        }
        replace(&mut self.penalty_relief_over28, &patch.penalty_relief_over28);
        if let Some(p) = &patch.longevity {
            self.longevity.apply(p);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AgeDecayPatch {
    pub enabled: Option<bool>,
    pub start_age: Option<u32>,
    pub ratio: Option<f64>,
}

impl Merge for AgeDecay {
    type Patch = AgeDecayPatch;

    fn apply(&mut self, patch: &AgeDecayPatch) {
        replace(&mut self.enabled, &patch.enabled);
        replace(&mut self.start_age, &patch.start_age);
        replace(&mut self.ratio, &patch.ratio);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PositionLongevityPatch {
    pub decay_start_age: Option<BTreeMap<Position, u32>>,
    pub floor_age: Option<BTreeMap<Position, u32>>,
}

impl Merge for PositionLongevity {
    type Patch = PositionLongevityPatch;

    fn apply(&mut self, patch: &PositionLongevityPatch) {
        merge_map(&mut self.decay_start_age, &patch.decay_start_age);
        merge_map(&mut self.floor_age, &patch.floor_age);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct YouthBufferPatch {
    pub band: Option<BTreeMap<u32, f64>>,
    pub dmax: Option<BTreeMap<Position, f64>>,
}

impl Merge for YouthBufferSettings {
    type Patch = YouthBufferPatch;

    fn apply(&mut self, patch: &YouthBufferPatch) {
        merge_map(&mut self.band, &patch.band);
        merge_map(&mut self.dmax, &patch.dmax);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DevTraitPatch {
    pub trait_scores: Option<BTreeMap<DevTrait, f64>>,
    pub dcap: Option<BTreeMap<Position, f64>>,
    pub weights: Option<BTreeMap<Position, TraitWeightsPatch>>,
}

impl Merge for DevTraitSettings {
    type Patch = DevTraitPatch;

    fn apply(&mut self, patch: &DevTraitPatch) {
        merge_map(&mut self.trait_scores, &patch.trait_scores);
        merge_map(&mut self.dcap, &patch.dcap);
        merge_nested_map(&mut self.weights, &patch.weights);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TraitWeightsPatch {
    pub w_xp: Option<f64>,
    pub w_abil: Option<f64>,
}

impl Merge for TraitWeights {
    type Patch = TraitWeightsPatch;

    fn apply(&mut self, patch: &TraitWeightsPatch) {
        replace(&mut self.w_xp, &patch.w_xp);
        replace(&mut self.w_abil, &patch.w_abil);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PhysicalPatch {
    pub speed: Option<SpeedPatch>,
    pub throw_power: Option<ThrowPowerPatch>,
    pub height: Option<HeightPatch>,
    pub ability_slots: Option<AbilitySlotPatch>,
}

impl Merge for PhysicalSettings {
    type Patch = PhysicalPatch;

    fn apply(&mut self, patch: &PhysicalPatch) {
        merge_optional(&mut self.speed, &patch.speed);
        merge_optional(&mut self.throw_power, &patch.throw_power);
        merge_optional(&mut self.height, &patch.height);
        merge_optional(&mut self.ability_slots, &patch.ability_slots);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SpeedPatch {
    pub enabled: Option<bool>,
    pub cap_up: Option<BTreeMap<Position, f64>>,
    pub cap_down_scale: Option<f64>,
    pub pivot: Option<BTreeMap<Position, f64>>,
    pub steps_up: Option<BTreeMap<Position, f64>>,
    pub steps_down: Option<BTreeMap<Position, f64>>,
}

impl Merge for SpeedSettings {
    type Patch = SpeedPatch;

    fn apply(&mut self, patch: &SpeedPatch) {
        replace(&mut self.enabled, &patch.enabled);
        merge_map(&mut self.cap_up, &patch.cap_up);
        replace(&mut self.cap_down_scale, &patch.cap_down_scale);
        merge_map(&mut self.pivot, &patch.pivot);
        merge_map(&mut self.steps_up, &patch.steps_up);
        merge_map(&mut self.steps_down, &patch.steps_down);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ThrowPowerPatch {
    pub enabled: Option<bool>,
    pub cap_up: Option<f64>,
    pub cap_down_scale: Option<f64>,
    pub pivot: Option<f64>,
    pub steps_up: Option<f64>,
    pub steps_down: Option<f64>,
}

impl Merge for ThrowPowerSettings {
    type Patch = ThrowPowerPatch;

    fn apply(&mut self, patch: &ThrowPowerPatch) {
        replace(&mut self.enabled, &patch.enabled);
        replace(&mut self.cap_up, &patch.cap_up);
        replace(&mut self.cap_down_scale, &patch.cap_down_scale);
        replace(&mut self.pivot, &patch.pivot);
        replace(&mut self.steps_up, &patch.steps_up);
        replace(&mut self.steps_down, &patch.steps_down);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HeightPatch {
    pub enabled: Option<bool>,
    pub inches_to_cap: Option<f64>,
    pub cap_down_scale: Option<f64>,
    pub baselines_in: Option<BTreeMap<Position, f64>>,
    pub cap_up: Option<BTreeMap<Position, f64>>,
}

impl Merge for HeightSettings {
    type Patch = HeightPatch;

    fn apply(&mut self, patch: &HeightPatch) {
        replace(&mut self.enabled, &patch.enabled);
        replace(&mut self.inches_to_cap, &patch.inches_to_cap);
        replace(&mut self.cap_down_scale, &patch.cap_down_scale);
        merge_map(&mut self.baselines_in, &patch.baselines_in);
        merge_map(&mut self.cap_up, &patch.cap_up);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AbilitySlotPatch {
    pub enabled: Option<bool>,
    pub thresholds: Option<BTreeMap<u32, f64>>,
    pub age_band: Option<BTreeMap<u32, f64>>,
}

impl Merge for AbilitySlotSettings {
    type Patch = AbilitySlotPatch;

    fn apply(&mut self, patch: &AbilitySlotPatch) {
        replace(&mut self.enabled, &patch.enabled);
        merge_map(&mut self.thresholds, &patch.thresholds);
        merge_map(&mut self.age_band, &patch.age_band);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GravityPatch {
    pub enabled: Option<bool>,
    pub threshold: Option<f64>,
    pub vmax: Option<f64>,
}

impl Merge for GravitySettings {
    type Patch = GravityPatch;

    fn apply(&mut self, patch: &GravityPatch) {
        replace(&mut self.enabled, &patch.enabled);
        replace(&mut self.threshold, &patch.threshold);
        replace(&mut self.vmax, &patch.vmax);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FuturePickPatch {
    pub enabled: Option<bool>,
    pub baseline: Option<BaselineStrategy>,
    pub mid_round_picks: Option<BTreeMap<u32, u32>>,
    pub schedule: Option<BTreeMap<u32, BTreeMap<u32, f64>>>,
}

impl Merge for FuturePickSettings {
    type Patch = FuturePickPatch;

    fn apply(&mut self, patch: &FuturePickPatch) {
        replace(&mut self.enabled, &patch.enabled);
        replace(&mut self.baseline, &patch.baseline);
        merge_map(&mut self.mid_round_picks, &patch.mid_round_picks);
        merge_nested_map(&mut self.schedule, &patch.schedule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(body: &str) -> SettingsPatch {
        SettingsPatch::from_json(body).unwrap()
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let settings = Settings::default();
        let empty = patch("{}");
        assert!(empty.is_empty());
        assert_eq!(merge_settings(&settings, &empty), settings);
    }

    #[test]
    fn test_scalar_replaces_and_siblings_survive() {
        let settings = Settings::default();
        let merged = merge_settings(&settings, &patch(r#"{"age": {"gain": 3.0}}"#));
        assert_eq!(merged.age.gain, 3.0);
        assert_eq!(merged.age.cliff_28_plus, settings.age.cliff_28_plus);
        assert_eq!(merged.age.base_schedule, settings.age.base_schedule);
        // the input tree is untouched
        assert_eq!(settings.age.gain, DEFAULT_AGE_GAIN);
    }

    #[test]
    fn test_maps_merge_key_by_key() {
        let settings = Settings::default();
        let merged = merge_settings(&settings, &patch(r#"{"pos_offsets": {"WR": 0.70}}"#));
        assert_eq!(merged.pos_offsets[&Position::WR], 0.70);
        assert_eq!(merged.pos_offsets[&Position::QB], 1.00);
        assert_eq!(merged.pos_offsets.len(), settings.pos_offsets.len());
    }

    #[test]
    fn test_nested_records_merge() {
        let settings = Settings::default();
        let merged = merge_settings(
            &settings,
            &patch(r#"{"dev_trait": {"weights": {"QB": {"w_xp": 0.6}}}, "future_picks": {"schedule": {"1": {"2": 0.55}}}}"#),
        );
        let qb = merged.dev_trait.weights[&Position::QB];
        assert_eq!(qb.w_xp, 0.6);
        assert_eq!(qb.w_abil, 0.5);
        let round_one = &merged.future_picks.as_ref().unwrap().schedule[&1];
        assert_eq!(round_one[&1], 0.75);
        assert_eq!(round_one[&2], 0.55);
    }

    #[test]
    fn test_optional_block_created_from_defaults() {
        let mut settings = Settings::default();
        settings.gravity = None;
        let merged = merge_settings(&settings, &patch(r#"{"gravity": {"vmax": 20000}}"#));
        let gravity = merged.gravity.unwrap();
        assert!(gravity.enabled);
        assert_eq!(gravity.threshold, DEFAULT_GRAVITY_THRESHOLD);
        assert_eq!(gravity.vmax, 20000.0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let settings = Settings::default();
        let p = patch(
            r#"{"version": 2, "pos_spread_scalar": 1.2, "age": {"decay": {"ratio": 0.9}, "longevity": {"floor_age": {"WR": 36}}},
                "physical": {"speed": {"pivot": {"WR": 92}}}, "future_picks": {"baseline": "projected"}}"#,
        );
        let once = merge_settings(&settings, &p);
        let twice = merge_settings(&once, &p);
        assert_eq!(once, twice);
        assert_eq!(once.version, 2);
        assert_eq!(once.future_picks.as_ref().unwrap().baseline, BaselineStrategy::Projected);
    }

    #[test]
    fn test_sequential_patches_compose() {
        let settings = Settings::default();
        let a = patch(r#"{"age": {"gain": 3.0}}"#);
        let b = patch(r#"{"age": {"cliff_28_plus": 0.8}}"#);
        let combined = patch(r#"{"age": {"gain": 3.0, "cliff_28_plus": 0.8}}"#);
        let stepwise = merge_settings(&merge_settings(&settings, &a), &b);
        assert_eq!(stepwise, merge_settings(&settings, &combined));
    }

    #[test]
    fn test_unknown_patch_keys_rejected() {
        let err = SettingsPatch::from_json(r#"{"age": {"gian": 3.0}}"#).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(SettingsPatch::from_json(r#"{"pos_offsets": {"QBX": 1.0}}"#).is_err());
        assert!(SettingsPatch::from_json(r#"{"pos_spread_scalar": "wide"}"#).is_err());
    }
}
