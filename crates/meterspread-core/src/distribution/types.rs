//! Request, bucket and result types for the distribution engine.

use serde::{Deserialize, Serialize};

use super::profile::{TargetRange, UsageProfile};

/// Largest supported number of decimal digits.
pub const MAX_PRECISION: u32 = 6;

/// Input of a single distribution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRequest {
    /// Meter reading at the start of the span
    pub start_value: f64,
    /// Meter reading at the end of the span
    pub end_value: f64,
    /// Number of sub-intervals
    pub bucket_count: usize,
    /// Hour of day of the first bucket (0-23)
    pub start_offset: u8,
    pub profile: UsageProfile,
    /// Decimal digits of every produced value
    pub precision: u32,
}

impl DistributionRequest {
    /// Create a residential request starting at 08:00 with one decimal.
    pub fn new(start_value: f64, end_value: f64, bucket_count: usize) -> Self {
        Self {
            start_value,
            end_value,
            bucket_count,
            start_offset: 8,
            profile: UsageProfile::Residential,
            precision: 1,
        }
    }

    /// Set the hour of the first bucket
    pub fn with_start_offset(mut self, hour: u8) -> Self {
        self.start_offset = hour;
        self
    }

    /// Set the usage profile
    pub fn with_profile(mut self, profile: UsageProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the decimal precision
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// The known delta every run must reproduce.
    pub fn total_target(&self) -> f64 {
        self.end_value - self.start_value
    }

    /// Hour of day of the bucket at `index`.
    pub fn hour_of(&self, index: usize) -> u8 {
        ((usize::from(self.start_offset) + index) % 24) as u8
    }
}

/// One sub-interval while it moves through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub hour_of_day: u8,
    pub constraint: Option<TargetRange>,
    pub raw_weight: f64,
    /// Quantized value, as a count of precision steps
    pub final_units: i64,
    /// Designated peak from the weight policy
    pub is_peak: bool,
    /// Fraction of a step discarded by the floor
    pub fractional_remainder: f64,
}

impl Bucket {
    pub fn new(hour_of_day: u8, constraint: Option<TargetRange>) -> Self {
        Self {
            hour_of_day,
            constraint,
            raw_weight: 0.0,
            final_units: 0,
            is_peak: false,
            fractional_remainder: 0.0,
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.constraint.is_some()
    }
}

/// Direction relative to the previous bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Classification by ratio to the average bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    Low,
    Normal,
    High,
    Peak,
}

impl Trend {
    pub fn symbol(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        }
    }
}

impl UsageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageStatus::Low => "low",
            UsageStatus::Normal => "normal",
            UsageStatus::High => "high",
            UsageStatus::Peak => "peak",
        }
    }
}

/// One row of engine output, in time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    /// 1-based position
    pub index: usize,
    /// "Period N"
    pub label: String,
    /// "HH:00"
    pub hour_label: String,
    pub value: f64,
    /// Meter reading at the end of this period
    pub cumulative: f64,
    pub is_peak: bool,
    pub trend: Trend,
    pub status: UsageStatus,
    /// Value relative to the largest value (0-100)
    pub intensity: f64,
    pub percentage_of_total: f64,
    /// "min - max" for hours with an explicit range, "-" otherwise
    pub target_range: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_and_builders() {
        let req = DistributionRequest::new(100.0, 124.0, 4)
            .with_start_offset(22)
            .with_profile(UsageProfile::Flat)
            .with_precision(0);
        assert_eq!(req.total_target(), 24.0);
        assert_eq!(req.profile, UsageProfile::Flat);
        assert_eq!(req.precision, 0);
    }

    #[test]
    fn hours_wrap_past_midnight() {
        let req = DistributionRequest::new(0.0, 1.0, 4).with_start_offset(22);
        let hours: Vec<_> = (0..4).map(|i| req.hour_of(i)).collect();
        assert_eq!(hours, vec![22, 23, 0, 1]);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&UsageStatus::Peak).unwrap();
        assert_eq!(json, "\"peak\"");
        let json = serde_json::to_string(&Trend::Stable).unwrap();
        assert_eq!(json, "\"stable\"");
    }
}
