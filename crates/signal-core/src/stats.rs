//! Numeric helpers shared by the sentiment and alpha crates.

/// Compute the mean of a data slice. Empty input yields `None` so callers can
/// tell "no data" apart from a genuine zero average.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Clamp `value` into `[min, max]`. NaN collapses to zero so it can never reach
/// a fixed-precision column.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(min).min(max)
}

/// True when `value` is finite and inside `[min, max]`.
pub fn within(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}
