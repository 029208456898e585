//! Result assembly: cumulative meter readings and per-bucket classification.

use super::profile::UsageProfile;
use super::reconcile::{round_to, step_factor, units_to_value};
use super::tuning::EngineConfig;
use super::types::{Bucket, DistributionRequest, PeriodResult, Trend, UsageStatus};

/// Snap `value` to the precision grid when it is only floating-point drift
/// away from it; values genuinely finer than the grid are kept.
fn snap_to_step(value: f64, precision: u32) -> f64 {
    let rounded = round_to(value, precision);
    let tolerance = 1e-6 / step_factor(precision);
    if (value - rounded).abs() <= tolerance {
        rounded
    } else {
        value
    }
}

fn trend(previous: Option<f64>, value: f64, deadband: f64) -> Trend {
    match previous {
        None => Trend::Stable,
        Some(prev) if value > prev * (1.0 + deadband) => Trend::Up,
        Some(prev) if value < prev * (1.0 - deadband) => Trend::Down,
        Some(_) => Trend::Stable,
    }
}

fn status(designated_peak: bool, ratio: Option<f64>, config: &EngineConfig) -> UsageStatus {
    match ratio {
        _ if designated_peak => UsageStatus::Peak,
        Some(r) if r > config.status_peak_ratio => UsageStatus::Peak,
        Some(r) if r > config.status_high_ratio => UsageStatus::High,
        Some(r) if r < config.status_low_ratio => UsageStatus::Low,
        _ => UsageStatus::Normal,
    }
}

fn peak_ratio(profile: UsageProfile, config: &EngineConfig) -> f64 {
    match profile {
        UsageProfile::Residential => config.residential_peak_ratio,
        UsageProfile::Commercial | UsageProfile::Flat => config.simple_peak_ratio,
    }
}

/// Turn reconciled buckets into output rows.
///
/// Cumulative readings are computed from the integer step prefix sum so no
/// drift accumulates; the last row is then pinned to `end_value` and its
/// value absorbs whatever residual remains.
pub fn assemble(
    buckets: &[Bucket],
    request: &DistributionRequest,
    config: &EngineConfig,
) -> Vec<PeriodResult> {
    let n = buckets.len();
    if n == 0 {
        return Vec::new();
    }

    let precision = request.precision;
    let total = request.total_target();

    let mut values = Vec::with_capacity(n);
    let mut cumulatives = Vec::with_capacity(n);
    let mut prefix_units: i64 = 0;
    for bucket in buckets {
        prefix_units += bucket.final_units;
        values.push(units_to_value(bucket.final_units, precision));
        cumulatives.push(request.start_value + units_to_value(prefix_units, precision));
    }

    let last = n - 1;
    let before_last = if last == 0 {
        request.start_value
    } else {
        cumulatives[last - 1]
    };
    // The step total never exceeds the delta, so only float noise can dip below zero
    values[last] = snap_to_step(request.end_value - before_last, precision).max(0.0);
    cumulatives[last] = request.end_value;

    let average = total / n as f64;
    let max_value = values.iter().copied().fold(0.0_f64, f64::max);
    let peak_ratio = peak_ratio(request.profile, config);

    let mut results = Vec::with_capacity(n);
    for (i, bucket) in buckets.iter().enumerate() {
        let value = values[i];
        let ratio = (average > 0.0).then(|| value / average);

        results.push(PeriodResult {
            index: i + 1,
            label: format!("Period {}", i + 1),
            hour_label: format!("{:02}:00", bucket.hour_of_day),
            value,
            cumulative: cumulatives[i],
            is_peak: bucket.is_peak || ratio.is_some_and(|r| r > peak_ratio),
            trend: trend(i.checked_sub(1).map(|p| values[p]), value, config.trend_deadband),
            status: status(bucket.is_peak, ratio, config),
            intensity: if max_value > 0.0 {
                value / max_value * 100.0
            } else {
                0.0
            },
            percentage_of_total: if total > 0.0 {
                value / total * 100.0
            } else {
                0.0
            },
            target_range: bucket
                .constraint
                .map(|range| range.label())
                .unwrap_or_else(|| "-".to_string()),
        });
    }

    results
}
