//! Soft cap ("gravity") for composed values

/// Exponential compression above `threshold`, bounded by `vmax`.
///
/// Values at or below the threshold pass through unchanged. Above it the
/// excess `d` maps to `threshold + C * (1 - e^(-d / C))` with
/// `C = max(1, vmax - threshold)`, which is continuous and increasing at the
/// threshold and never exceeds `vmax`. The compressed term is computed with
/// `exp_m1`, so any value above the threshold stays strictly above it.
pub fn gravity(value: f64, threshold: f64, vmax: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value <= threshold {
        return value;
    }
    let headroom = (vmax - threshold).max(1.0);
    let excess = value - threshold;
    let compressed = threshold - headroom * (-excess / headroom).exp_m1();
    compressed.min(vmax)
}
