//! Overall rating to reference-position value
//!
//! Ratings are mapped onto the draft pick table: 99 lines up with pick 1 and
//! 60 with pick 224. The table value at that pick, normalised between the
//! table's extremes, interpolates between the two calibration anchors.

use crate::pick_table::{value_at, TOTAL_PICKS};
use crate::settings::Settings;

pub const MIN_CALIBRATED_OVR: i32 = 60;
pub const MAX_CALIBRATED_OVR: i32 = 99;

/// Pick number a rating lines up with
pub fn anchor_pick(rating: i32) -> u32 {
    let span = (MAX_CALIBRATED_OVR - MIN_CALIBRATED_OVR) as f64;
    let t = ((rating - MIN_CALIBRATED_OVR) as f64 / span).clamp(0.0, 1.0);
    let last = TOTAL_PICKS as f64;
    (last - t * (last - 1.0)).round() as u32
}

/// Interpolation fraction in [0, 1] for a rating, shaped by the curve's gamma
pub fn anchor_fraction(rating: i32, settings: &Settings) -> f64 {
    let top = value_at(1);
    let bottom = value_at(TOTAL_PICKS as i64);
    let g = (value_at(anchor_pick(rating) as i64) - bottom) / (top - bottom);
    let gamma = settings.ovr_curve.gamma;
    if gamma > 0.0 && gamma != 1.0 {
        g.powf(1.0 / gamma)
    } else {
        g
    }
}

/// Reference-position value for a rating
pub fn anchor_value(rating: i32, settings: &Settings) -> f64 {
    let curve = &settings.ovr_curve;
    curve.qb60 + (curve.qb99 - curve.qb60) * anchor_fraction(rating, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_picks() {
        assert_eq!(anchor_pick(99), 1);
        assert_eq!(anchor_pick(60), 224);
        assert_eq!(anchor_pick(120), 1);
        assert_eq!(anchor_pick(0), 224);
        // t = 20/39, 224 - t * 223 = 109.64
        assert_eq!(anchor_pick(80), 110);
    }

    #[test]
    fn test_anchors_hit_calibration_points() {
        let settings = Settings::default();
        assert!((anchor_value(60, &settings) - 2.5).abs() < 1e-9);
        assert!((anchor_value(99, &settings) - 6000.0).abs() < 1e-9);
        assert!((anchor_value(45, &settings) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_mid_rating_between_anchors() {
        let settings = Settings::default();
        let v80 = anchor_value(80, &settings);
        assert!(v80 > 2.5 && v80 < 6000.0);
        // pick 110 is worth 64 on the chart
        let expected = 2.5 + (6000.0 - 2.5) * (64.0 - 2.0) / 2998.0;
        assert!((v80 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_non_decreasing_in_rating() {
        let settings = Settings::default();
        for r in 60..99 {
            assert!(anchor_value(r + 1, &settings) >= anchor_value(r, &settings));
        }
    }

    #[test]
    fn test_gamma_lifts_top_end_and_keeps_anchors() {
        let mut settings = Settings::default();
        let linear = anchor_value(90, &settings);
        settings.ovr_curve.gamma = 1.15;
        assert!(anchor_value(90, &settings) > linear);
        assert!((anchor_value(99, &settings) - 6000.0).abs() < 1e-9);
        assert!((anchor_value(60, &settings) - 2.5).abs() < 1e-9);
    }
}
