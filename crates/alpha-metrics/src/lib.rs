//! Alpha Metrics
//!
//! Expectation gap, narrative velocity and sentiment-price divergence over a
//! rolling window, blended into a composite score and a discrete signal.

pub mod composite;
pub mod engine;
pub mod metrics;

pub use composite::{combine, conviction_for, signal_for, CompositeSignal};
pub use engine::{AlphaEngine, AlphaEngineConfig, AlphaOutcome, MetricInputs};
pub use metrics::{clamp_metric, divergence, expectation_gap, narrative_velocity, news_share, METRIC_BOUND};
