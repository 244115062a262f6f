//! Calibration settings tree
//!
//! Settings are resolved once per request and passed by reference into every
//! formula. They are never mutated in place: updates go through
//! [`crate::merge::merge_settings`], which returns a new tree.

use crate::error::{Result, ValuationError};
use crate::types::{DevTrait, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default global floor age when a settings row does not name one
pub const DEFAULT_FLOOR_AGE: u32 = 40;
/// Default age after which geometric decay replaces the schedule
pub const DEFAULT_DECAY_START_AGE: u32 = 29;
/// Default year-over-year decay ratio past the decay start age
pub const DEFAULT_DECAY_RATIO: f64 = 0.82;
/// Default age-curve amplification
pub const DEFAULT_AGE_GAIN: f64 = 4.0;
/// Default soft cap threshold
pub const DEFAULT_GRAVITY_THRESHOLD: f64 = 6000.0;
/// Default soft cap ceiling
pub const DEFAULT_GRAVITY_VMAX: f64 = 18000.0;

fn default_version() -> u32 {
    1
}

fn default_gamma() -> f64 {
    1.0
}

fn default_gain() -> f64 {
    DEFAULT_AGE_GAIN
}

fn default_floor_age() -> u32 {
    DEFAULT_FLOOR_AGE
}

/// Complete valuation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Calibration revision label
    #[serde(default = "default_version")]
    pub version: u32,

    /// Scales every position offset
    pub pos_spread_scalar: f64,

    /// Per-position offset in [-1, 1]; missing positions use 0
    pub pos_offsets: BTreeMap<Position, f64>,

    /// Rating anchors for the reference position
    pub ovr_curve: OvrCurve,

    /// Age curve
    pub age: AgeSettings,

    /// Upside bonus for young players
    pub youth_buffer: YouthBufferSettings,

    /// Development trait tables
    pub dev_trait: DevTraitSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<PhysicalSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<GravitySettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_picks: Option<FuturePickSettings>,
}

/// Two calibration anchors mapping ratings 60 and 99 to values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OvrCurve {
    pub qb60: f64,
    pub qb99: f64,
    /// Curvature of the interpolation fraction; 1.0 is linear in table value
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeSettings {
    /// Base multiplier per age, 20..=40; missing ages use 1.0
    pub base_schedule: BTreeMap<u32, f64>,
    pub cliff_25_27: f64,
    pub cliff_28_plus: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default = "default_floor_age")]
    pub floor_age: u32,
    #[serde(default)]
    pub floor_value: f64,
    #[serde(default)]
    pub decay: AgeDecay,
    /// Share of the sub-1.0 penalty given back for ages over 28
    #[serde(default)]
    pub penalty_relief_over28: f64,
    #[serde(default)]
    pub longevity: PositionLongevity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AgeDecay {
    pub enabled: bool,
    pub start_age: u32,
    pub ratio: f64,
}

impl Default for AgeDecay {
    fn default() -> Self {
        Self { enabled: true, start_age: DEFAULT_DECAY_START_AGE, ratio: DEFAULT_DECAY_RATIO }
    }
}

/// Per-position exceptions to the global decay start and floor ages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PositionLongevity {
    pub decay_start_age: BTreeMap<Position, u32>,
    pub floor_age: BTreeMap<Position, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YouthBufferSettings {
    /// Weight per age, 20..=28
    pub band: BTreeMap<u32, f64>,
    /// Maximum bonus per position
    pub dmax: BTreeMap<Position, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevTraitSettings {
    pub trait_scores: BTreeMap<DevTrait, f64>,
    /// Per-position capacity; missing positions use 0
    pub dcap: BTreeMap<Position, f64>,
    /// Experience/abilities split; missing positions use 0.5/0.5
    #[serde(default)]
    pub weights: BTreeMap<Position, TraitWeights>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitWeights {
    pub w_xp: f64,
    pub w_abil: f64,
}

impl Default for TraitWeights {
    fn default() -> Self {
        Self { w_xp: 0.5, w_abil: 0.5 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PhysicalSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<SpeedSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw_power: Option<ThrowPowerSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<HeightSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability_slots: Option<AbilitySlotSettings>,
}

/// Speed curve; positions without a pivot are unaffected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SpeedSettings {
    pub enabled: bool,
    pub cap_up: BTreeMap<Position, f64>,
    pub cap_down_scale: f64,
    pub pivot: BTreeMap<Position, f64>,
    pub steps_up: BTreeMap<Position, f64>,
    pub steps_down: BTreeMap<Position, f64>,
}

/// Throw power curve, quarterbacks only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ThrowPowerSettings {
    pub enabled: bool,
    pub cap_up: f64,
    pub cap_down_scale: f64,
    pub pivot: f64,
    pub steps_up: f64,
    pub steps_down: f64,
}

/// Height curve; the same inch count reaches the cap in both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HeightSettings {
    pub enabled: bool,
    pub inches_to_cap: f64,
    pub cap_down_scale: f64,
    pub baselines_in: BTreeMap<Position, f64>,
    pub cap_up: BTreeMap<Position, f64>,
}

/// Ability-slot bonus for Superstar and X-Factor players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AbilitySlotSettings {
    pub enabled: bool,
    /// Multiplier by minimum slot count
    pub thresholds: BTreeMap<u32, f64>,
    /// Share of the bonus kept, by minimum age
    pub age_band: BTreeMap<u32, f64>,
}

/// Soft cap on composed values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GravitySettings {
    pub enabled: bool,
    pub threshold: f64,
    pub vmax: f64,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self { enabled: true, threshold: DEFAULT_GRAVITY_THRESHOLD, vmax: DEFAULT_GRAVITY_VMAX }
    }
}

/// How the reference pick for a future round is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStrategy {
    #[default]
    MidRound,
    Projected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FuturePickSettings {
    pub enabled: bool,
    pub baseline: BaselineStrategy,
    /// Anchor pick per round
    pub mid_round_picks: BTreeMap<u32, u32>,
    /// Discount by round, then by years out
    pub schedule: BTreeMap<u32, BTreeMap<u32, f64>>,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            cap_up: BTreeMap::new(),
            cap_down_scale: 1.0,
            pivot: BTreeMap::new(),
            steps_up: BTreeMap::new(),
            steps_down: BTreeMap::new(),
        }
    }
}

impl Default for ThrowPowerSettings {
    fn default() -> Self {
        Self { enabled: false, cap_up: 0.0, cap_down_scale: 1.0, pivot: 0.0, steps_up: 1.0, steps_down: 1.0 }
    }
}

impl Default for HeightSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            inches_to_cap: 1.0,
            cap_down_scale: 1.0,
            baselines_in: BTreeMap::new(),
            cap_up: BTreeMap::new(),
        }
    }
}

impl Default for AbilitySlotSettings {
    fn default() -> Self {
        Self { enabled: false, thresholds: BTreeMap::new(), age_band: BTreeMap::new() }
    }
}

impl Default for FuturePickSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            baseline: BaselineStrategy::MidRound,
            mid_round_picks: BTreeMap::new(),
            schedule: BTreeMap::new(),
        }
    }
}

fn by_position(entries: &[(Position, f64)]) -> BTreeMap<Position, f64> {
    entries.iter().copied().collect()
}

fn by_key<K: Ord + Copy, V: Copy>(entries: &[(K, V)]) -> BTreeMap<K, V> {
    entries.iter().copied().collect()
}

impl Default for Settings {
    /// The calibrated default row
    fn default() -> Self {
        use Position::*;

        let trait_capacity = by_position(&[
            (QB, 0.20), (WR, 0.14), (CB, 0.14), (LE, 0.14), (RE, 0.14), (LOLB, 0.14),
            (ROLB, 0.14), (LT, 0.10), (RT, 0.10), (DT, 0.10), (FS, 0.10), (SS, 0.10),
            (TE, 0.10), (MLB, 0.08), (HB, 0.08), (LG, 0.06), (C, 0.06), (RG, 0.06),
            (FB, 0.04), (K, 0.03), (P, 0.02), (LS, 0.00),
        ]);

        let groups: [(&[Position], f64, f64); 6] = [
            (&[QB, WR, CB, LE, RE, LOLB, ROLB], 0.50, 0.50),
            (&[LT, RT, DT, FS, SS, TE], 0.65, 0.35),
            (&[MLB, HB, FB], 0.70, 0.30),
            (&[LG, C, RG], 0.80, 0.20),
            (&[K, P], 0.90, 0.10),
            (&[LS], 1.00, 0.00),
        ];
        let weights = groups
            .iter()
            .flat_map(|(positions, w_xp, w_abil)| {
                positions.iter().map(move |pos| (*pos, TraitWeights { w_xp: *w_xp, w_abil: *w_abil }))
            })
            .collect();

        let mut longevity = PositionLongevity::default();
        longevity.decay_start_age.extend([(HB, 28), (QB, 31), (K, 31), (P, 31)]);
        longevity.floor_age.extend([(HB, 33), (QB, 39), (K, 39), (P, 39)]);
        for pos in [LT, LG, C, RG, RT] {
            longevity.decay_start_age.insert(pos, 30);
            longevity.floor_age.insert(pos, 37);
        }

        Self {
            version: default_version(),
            pos_spread_scalar: 1.5,
            pos_offsets: by_position(&[
                (QB, 1.00), (WR, 0.55), (CB, 0.50), (LT, 0.50), (RT, 0.50), (LE, 0.60),
                (RE, 0.60), (LOLB, 0.60), (ROLB, 0.60), (DT, 0.40), (FS, 0.45), (SS, 0.45),
                (TE, 0.40), (LG, 0.35), (C, 0.35), (RG, 0.35), (HB, 0.35), (MLB, 0.30),
                (FB, 0.20), (K, 0.15), (P, 0.10), (LS, 0.00),
            ]),
            ovr_curve: OvrCurve { qb60: 2.5, qb99: 6000.0, gamma: 1.0 },
            age: AgeSettings {
                base_schedule: by_key(&[
                    (20, 2.00), (21, 2.00), (22, 1.90), (23, 1.80), (24, 1.70), (25, 1.60),
                    (26, 1.50), (27, 1.40), (28, 1.00), (29, 1.00), (30, 0.95), (31, 0.90),
                    (32, 0.85), (33, 0.80), (34, 0.75), (35, 0.70), (36, 0.65), (37, 0.60),
                    (38, 0.55), (39, 0.50), (40, 0.45),
                ]),
                cliff_25_27: 0.90,
                cliff_28_plus: 0.75,
                gain: DEFAULT_AGE_GAIN,
                floor_age: 35,
                floor_value: 0.0,
                decay: AgeDecay::default(),
                penalty_relief_over28: 0.0,
                longevity,
            },
            youth_buffer: YouthBufferSettings {
                band: by_key(&[
                    (20, 1.00), (21, 1.00), (22, 0.85), (23, 0.70), (24, 0.50), (25, 0.35),
                    (26, 0.20), (27, 0.10), (28, 0.00),
                ]),
                dmax: trait_capacity.clone(),
            },
            dev_trait: DevTraitSettings {
                trait_scores: by_key(&[
                    (DevTrait::Normal, 0.00),
                    (DevTrait::Star, 2.64),
                    (DevTrait::Superstar, 5.36),
                    (DevTrait::XFactor, 8.00),
                ]),
                dcap: trait_capacity,
                weights,
            },
            physical: Some(PhysicalSettings {
                speed: Some(SpeedSettings {
                    enabled: true,
                    cap_up: by_position(&[(WR, 0.12), (HB, 0.10), (CB, 0.10), (FS, 0.06), (SS, 0.06), (TE, 0.05)]),
                    cap_down_scale: 1.25,
                    pivot: by_position(&[(WR, 91.0), (HB, 90.0), (CB, 91.0), (FS, 89.0), (SS, 88.0), (TE, 84.0)]),
                    steps_up: by_position(&[(WR, 8.0), (HB, 8.0), (CB, 8.0), (FS, 8.0), (SS, 8.0), (TE, 8.0)]),
                    steps_down: by_position(&[(WR, 5.0), (HB, 5.0), (CB, 5.0), (FS, 6.0), (SS, 6.0), (TE, 6.0)]),
                }),
                throw_power: Some(ThrowPowerSettings {
                    enabled: true,
                    cap_up: 0.10,
                    cap_down_scale: 1.20,
                    pivot: 93.0,
                    steps_up: 6.0,
                    steps_down: 5.0,
                }),
                height: Some(HeightSettings {
                    enabled: true,
                    inches_to_cap: 4.0,
                    cap_down_scale: 1.4,
                    baselines_in: by_position(&[(QB, 73.0), (WR, 72.0), (CB, 71.0), (TE, 76.0)]),
                    cap_up: by_position(&[(QB, 0.05), (WR, 0.03), (CB, 0.03), (TE, 0.02)]),
                }),
                ability_slots: Some(AbilitySlotSettings {
                    enabled: true,
                    thresholds: by_key(&[(1, 1.03), (2, 1.06), (3, 1.09), (4, 1.12), (5, 1.15)]),
                    age_band: by_key(&[(21, 1.00), (24, 0.95), (27, 0.85), (30, 0.74)]),
                }),
            }),
            gravity: Some(GravitySettings::default()),
            future_picks: Some(FuturePickSettings {
                enabled: true,
                baseline: BaselineStrategy::MidRound,
                mid_round_picks: by_key(&[(1, 16), (2, 48), (3, 80), (4, 112), (5, 144), (6, 176), (7, 208)]),
                schedule: [
                    (1, 0.75, 0.50),
                    (2, 0.80, 0.60),
                    (3, 0.85, 0.70),
                    (4, 0.90, 0.80),
                    (5, 0.90, 0.80),
                    (6, 0.95, 0.90),
                    (7, 0.95, 0.90),
                ]
                .into_iter()
                .map(|(round, one, two)| (round, by_key(&[(1, one), (2, two)])))
                .collect(),
            }),
        }
    }
}

impl Settings {
    /// Parse a complete settings tree, rejecting unknown keys
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| ValuationError::invalid_input(format!("settings: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Soft cap parameters in force; an absent block means the default cap
    pub fn effective_gravity(&self) -> GravitySettings {
        self.gravity.unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if !self.pos_spread_scalar.is_finite() || self.pos_spread_scalar < 0.0 {
            problems.push("pos_spread_scalar must be a non-negative number".to_string());
        }
        for (pos, offset) in &self.pos_offsets {
            if !(-1.0..=1.0).contains(offset) {
                problems.push(format!("pos_offsets.{} must lie in [-1, 1]", pos));
            }
        }
        let reference = 1.0
            + self.pos_spread_scalar * self.pos_offsets.get(&Position::REFERENCE).copied().unwrap_or(0.0);
        if reference <= 0.0 {
            problems.push("reference position multiplier must be positive".to_string());
        }

        if !self.ovr_curve.qb60.is_finite() || !self.ovr_curve.qb99.is_finite() {
            problems.push("ovr_curve anchors must be finite".to_string());
        }
        if !(self.ovr_curve.gamma > 0.0) {
            problems.push("ovr_curve.gamma must be positive".to_string());
        }

        let age = &self.age;
        if !age.gain.is_finite() {
            problems.push("age.gain must be finite".to_string());
        }
        if age.cliff_25_27 < 0.0 || age.cliff_28_plus < 0.0 {
            problems.push("age cliffs must be non-negative".to_string());
        }
        if age.floor_value < 0.0 {
            problems.push("age.floor_value must be non-negative".to_string());
        }
        if age.decay.ratio < 0.0 || age.decay.ratio > 1.0 {
            problems.push("age.decay.ratio must lie in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&age.penalty_relief_over28) {
            problems.push("age.penalty_relief_over28 must lie in [0, 1]".to_string());
        }

        if self.youth_buffer.band.values().chain(self.youth_buffer.dmax.values()).any(|v| *v < 0.0) {
            problems.push("youth_buffer weights must be non-negative".to_string());
        }
        if self.dev_trait.trait_scores.values().chain(self.dev_trait.dcap.values()).any(|v| *v < 0.0) {
            problems.push("dev_trait scores and capacities must be non-negative".to_string());
        }
        if self.dev_trait.weights.values().any(|w| w.w_xp < 0.0 || w.w_abil < 0.0) {
            problems.push("dev_trait weights must be non-negative".to_string());
        }

        if let Some(physical) = &self.physical {
            validate_physical(physical, &mut problems);
        }

        if let Some(gravity) = &self.gravity {
            if gravity.threshold < 0.0 || gravity.vmax <= gravity.threshold {
                problems.push("gravity requires 0 <= threshold < vmax".to_string());
            }
        }

        if let Some(future) = &self.future_picks {
            let bad_factor = future.schedule.values().flat_map(|row| row.values()).any(|f| !(*f > 0.0));
            if bad_factor {
                problems.push("future_picks.schedule factors must be positive".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValuationError::invalid_input(problems.join("; ")))
        }
    }
}

fn validate_physical(physical: &PhysicalSettings, problems: &mut Vec<String>) {
    if let Some(speed) = &physical.speed {
        if speed.cap_down_scale < 0.0 || speed.cap_up.values().any(|c| *c < 0.0) {
            problems.push("physical.speed caps must be non-negative".to_string());
        }
        if speed.steps_up.values().chain(speed.steps_down.values()).any(|s| *s <= 0.0) {
            problems.push("physical.speed steps must be positive".to_string());
        }
    }
    if let Some(thp) = &physical.throw_power {
        if thp.cap_up < 0.0 || thp.cap_down_scale < 0.0 {
            problems.push("physical.throw_power caps must be non-negative".to_string());
        }
        if thp.steps_up <= 0.0 || thp.steps_down <= 0.0 {
            problems.push("physical.throw_power steps must be positive".to_string());
        }
    }
    if let Some(height) = &physical.height {
        if height.cap_down_scale < 0.0 || height.cap_up.values().any(|c| *c < 0.0) {
            problems.push("physical.height caps must be non-negative".to_string());
        }
        if height.inches_to_cap <= 0.0 {
            problems.push("physical.height.inches_to_cap must be positive".to_string());
        }
    }
    if let Some(slots) = &physical.ability_slots {
        if slots.thresholds.values().chain(slots.age_band.values()).any(|v| *v < 0.0) {
            problems.push("physical.ability_slots values must be non-negative".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::default();
        let json = settings.to_json_pretty().unwrap();
        assert!(json.contains("\"X-Factor\""));
        assert!(json.contains("\"pos_spread_scalar\""));
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_minimal_settings_use_field_defaults() {
        let settings = Settings::from_json(
            r#"{
                "pos_spread_scalar": 1.5,
                "pos_offsets": {"QB": 1.0},
                "ovr_curve": {"qb60": 2.5, "qb99": 6000},
                "age": {"base_schedule": {"28": 1.0}, "cliff_25_27": 0.9, "cliff_28_plus": 0.75},
                "youth_buffer": {"band": {}, "dmax": {}},
                "dev_trait": {"trait_scores": {"Normal": 0}, "dcap": {}}
            }"#,
        )
        .unwrap();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.ovr_curve.gamma, 1.0);
        assert_eq!(settings.age.gain, DEFAULT_AGE_GAIN);
        assert_eq!(settings.age.floor_age, DEFAULT_FLOOR_AGE);
        assert_eq!(settings.age.decay, AgeDecay::default());
        assert!(settings.gravity.is_none());
        assert_eq!(settings.effective_gravity(), GravitySettings::default());
        settings.validate().unwrap();
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut value = serde_json::to_value(Settings::default()).unwrap();
        value["surprise"] = serde_json::json!(1);
        let err = Settings::from_json(&value.to_string()).unwrap_err();
        assert!(err.is_invalid_input());

        let mut value = serde_json::to_value(Settings::default()).unwrap();
        value["pos_offsets"]["XX"] = serde_json::json!(0.3);
        assert!(Settings::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_validate_catches_bad_values() {
        let mut settings = Settings::default();
        settings.gravity = Some(GravitySettings { enabled: true, threshold: 9000.0, vmax: 8000.0 });
        settings.pos_offsets.insert(Position::WR, 1.5);
        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("gravity"));
        assert!(err.contains("pos_offsets.WR"));
    }
}
