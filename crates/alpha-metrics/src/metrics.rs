//! The three alpha sub-metrics.

use signal_core::stats::clamp;

/// Largest magnitude a stored metric may take.
pub const METRIC_BOUND: f64 = 9.9999;

/// Scale applied to news share in narrative velocity.
pub const NEWS_SHARE_SCALE: f64 = 5.0;

pub fn clamp_metric(value: f64) -> f64 {
    clamp(value, -METRIC_BOUND, METRIC_BOUND)
}

/// Current mean sentiment minus the trailing baseline mean.
pub fn expectation_gap(current_mean: f64, baseline_mean: f64) -> f64 {
    clamp_metric(current_mean - baseline_mean)
}

/// Fraction of all recent articles that mention the entity. An empty window
/// gives zero rather than a division by zero.
pub fn news_share(mentioned_articles: i64, total_articles: i64) -> f64 {
    if total_articles <= 0 {
        return 0.0;
    }
    mentioned_articles.max(0) as f64 / total_articles as f64
}

/// `news_share × 5 × (1 + |current_mean|)`
pub fn narrative_velocity(news_share: f64, current_mean: f64) -> f64 {
    clamp_metric(news_share * NEWS_SHARE_SCALE * (1.0 + current_mean.abs()))
}

/// Sentiment direction against the realized fractional price move.
pub fn divergence(current_mean: f64, price_change_fraction: f64) -> f64 {
    clamp_metric(current_mean - price_change_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectation_gap() {
        assert!((expectation_gap(0.8, 0.3) - 0.5).abs() < 1e-12);
        assert!((expectation_gap(-0.4, 0.2) + 0.6).abs() < 1e-12);
        assert_eq!(expectation_gap(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_news_share() {
        assert_eq!(news_share(1, 10), 0.1);
        assert_eq!(news_share(3, 0), 0.0);
        assert_eq!(news_share(0, 25), 0.0);
    }

    #[test]
    fn test_narrative_velocity() {
        assert!((narrative_velocity(0.1, 0.8) - 0.9).abs() < 1e-12);
        assert!((narrative_velocity(0.1, -0.8) - 0.9).abs() < 1e-12);
        assert_eq!(narrative_velocity(0.0, 0.95), 0.0);
    }

    #[test]
    fn test_divergence() {
        assert!((divergence(0.8, -0.05) - 0.85).abs() < 1e-12);
        assert!((divergence(-0.2, 0.1) + 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(narrative_velocity(3.0, 1.0), METRIC_BOUND);
        assert_eq!(divergence(1.0, -20.0), METRIC_BOUND);
        assert_eq!(divergence(-1.0, 20.0), -METRIC_BOUND);
        assert_eq!(clamp_metric(f64::NAN), 0.0);
    }
}
