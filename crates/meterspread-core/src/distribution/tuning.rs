//! Tuning constants for the distribution engine.
//!
//! Every threshold, band and blend ratio the engine uses lives here so it can
//! be overridden from the `[engine]` section of the config file. The defaults
//! are taste rules for what a plausible consumption curve looks like, not
//! physical limits.

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` for uniform draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Soft upper bound for a single bucket's value
    pub realism_ceiling: f64,
    /// Buckets below `ceiling - headroom_margin` receive redistributed excess
    pub headroom_margin: f64,
    /// Random amount subtracted from the ceiling when capping a bucket
    pub clamp_jitter: Band,
    /// Cap/redistribute rounds before the clamp gives up
    pub max_clamp_passes: usize,

    /// Base draw for night hours
    pub night_range: Band,
    /// Base draw for every other hour
    pub day_range: Band,
    /// First night hour (inclusive)
    pub night_start_hour: u8,
    /// Last night hour (inclusive)
    pub night_end_hour: u8,

    /// Volatility multiplier band for regular requests
    pub volatility: Band,
    /// Wider band used when `bucket_count < short_request_buckets`
    pub short_volatility: Band,
    pub short_request_buckets: usize,
    /// Hard bounds on the final volatility multiplier
    pub volatility_limits: Band,
    pub spike_probability: f64,
    pub spike_multiplier: f64,
    pub drop_probability: f64,
    pub drop_multiplier: f64,

    /// Share of a blended weight that comes from the fresh draw
    pub fresh_weight_blend: f64,

    /// Adjacent pairs diverging by more than this fraction of their average are smoothed
    pub adjacent_divergence: f64,
    /// Fraction of the pair average blended into each adjacent bucket
    pub adjacent_pull: f64,
    /// Acceptable split of a block pair, as the first bucket's share
    pub block_split: Band,
    /// Fraction of the pair midpoint blended into each block bucket
    pub block_pull: f64,

    /// Safety cap on overshoot correction iterations
    pub reconcile_iteration_cap: usize,

    /// Relative change below which the trend is stable
    pub trend_deadband: f64,
    /// Ratio to average above which a value counts as a peak (residential)
    pub residential_peak_ratio: f64,
    /// Ratio to average above which a value counts as a peak (commercial, flat)
    pub simple_peak_ratio: f64,
    pub status_peak_ratio: f64,
    pub status_high_ratio: f64,
    pub status_low_ratio: f64,

    /// Fixed seed for reproducible output (None = entropy)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            realism_ceiling: 60.0,
            headroom_margin: 20.0,
            clamp_jitter: Band::new(0.5, 2.0),
            max_clamp_passes: 8,

            night_range: Band::new(1.0, 4.0),
            day_range: Band::new(5.0, 12.0),
            night_start_hour: 22,
            night_end_hour: 4,

            volatility: Band::new(0.6, 1.8),
            short_volatility: Band::new(0.2, 3.0),
            short_request_buckets: 6,
            volatility_limits: Band::new(0.2, 3.0),
            spike_probability: 0.08,
            spike_multiplier: 1.8,
            drop_probability: 0.08,
            drop_multiplier: 0.4,

            fresh_weight_blend: 0.7,

            adjacent_divergence: 0.5,
            adjacent_pull: 0.3,
            block_split: Band::new(0.35, 0.65),
            block_pull: 0.5,

            reconcile_iteration_cap: 10_000,

            trend_deadband: 0.05,
            residential_peak_ratio: 1.6,
            simple_peak_ratio: 1.1,
            status_peak_ratio: 1.6,
            status_high_ratio: 1.2,
            status_low_ratio: 0.6,

            seed: None,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Night window wraps midnight when start > end (22..=4).
    pub fn is_night(&self, hour: u8) -> bool {
        let (start, end) = (self.night_start_hour, self.night_end_hour);
        if start <= end {
            hour >= start && hour <= end
        } else {
            hour >= start || hour <= end
        }
    }
}
