//! Composite signal: a weighted blend of the three alpha metrics mapped onto a
//! five-level recommendation.
//!
//! Pure and deterministic; no I/O happens here.

use serde::{Deserialize, Serialize};
use signal_core::Signal;

pub const EXPECTATION_GAP_WEIGHT: f64 = 0.45;
pub const NARRATIVE_VELOCITY_WEIGHT: f64 = 0.30;
pub const DIVERGENCE_WEIGHT: f64 = 0.25;

const STRONG_BUY_ABOVE: f64 = 0.5;
const BUY_ABOVE: f64 = 0.2;
const HOLD_ABOVE: f64 = -0.2;
const SELL_ABOVE: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub composite_score: f64,
    pub signal: Signal,
    /// Magnitude of the composite, capped at 1.0
    pub conviction: f64,
}

/// Map a composite score onto a signal. Comparisons are strict, so a score
/// sitting exactly on a threshold lands in the lower bucket.
pub fn signal_for(composite_score: f64) -> Signal {
    if composite_score > STRONG_BUY_ABOVE {
        Signal::StrongBuy
    } else if composite_score > BUY_ABOVE {
        Signal::Buy
    } else if composite_score > HOLD_ABOVE {
        Signal::Hold
    } else if composite_score > SELL_ABOVE {
        Signal::Sell
    } else {
        Signal::StrongSell
    }
}

pub fn conviction_for(composite_score: f64) -> f64 {
    composite_score.abs().min(1.0)
}

pub fn combine(expectation_gap: f64, narrative_velocity: f64, divergence: f64) -> CompositeSignal {
    let composite_score = EXPECTATION_GAP_WEIGHT * expectation_gap
        + NARRATIVE_VELOCITY_WEIGHT * narrative_velocity
        + DIVERGENCE_WEIGHT * divergence;

    CompositeSignal {
        composite_score,
        signal: signal_for(composite_score),
        conviction: conviction_for(composite_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        assert_eq!(combine(1.0, 1.0, 1.0).composite_score, 1.0);
    }

    #[test]
    fn test_deterministic() {
        let inputs = [(0.5, 0.9, 0.85), (-3.2, 0.0, 1.7), (9.9999, -9.9999, 0.1234)];
        for (eg, nv, div) in inputs {
            let a = combine(eg, nv, div);
            let b = combine(eg, nv, div);
            assert_eq!(a.composite_score.to_bits(), b.composite_score.to_bits());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_threshold_boundaries_fall_low() {
        assert_eq!(signal_for(0.5), Signal::Buy);
        assert_eq!(signal_for(0.2), Signal::Hold);
        assert_eq!(signal_for(-0.2), Signal::Sell);
        assert_eq!(signal_for(-0.5), Signal::StrongSell);

        let at_half = combine(0.5, 0.5, 0.5);
        assert_eq!(at_half.composite_score, 0.5);
        assert_eq!(at_half.signal, Signal::Buy);
    }

    #[test]
    fn test_signal_buckets() {
        assert_eq!(signal_for(0.51), Signal::StrongBuy);
        assert_eq!(signal_for(0.3), Signal::Buy);
        assert_eq!(signal_for(0.0), Signal::Hold);
        assert_eq!(signal_for(-0.3), Signal::Sell);
        assert_eq!(signal_for(-0.9), Signal::StrongSell);
    }

    #[test]
    fn test_all_zero_is_hold() {
        let c = combine(0.0, 0.0, 0.0);
        assert_eq!(c.signal, Signal::Hold);
        assert_eq!(c.conviction, 0.0);
    }

    #[test]
    fn test_conviction_bounded_and_symmetric() {
        for x in [0.0, 0.05, 0.3, 0.75, 1.0, 2.5, 9.9999] {
            let pos = conviction_for(x);
            let neg = conviction_for(-x);
            assert_eq!(pos, neg);
            assert!((0.0..=1.0).contains(&pos));
        }
        assert_eq!(combine(9.0, 9.0, 9.0).conviction, 1.0);
    }

    #[test]
    fn test_conviction_not_rounded_up() {
        let c = combine(0.5, 0.9, 0.85);
        assert!((c.composite_score - 0.7075).abs() < 1e-12);
        assert_eq!(c.signal, Signal::StrongBuy);
        assert_eq!(c.conviction, c.composite_score);
    }
}
