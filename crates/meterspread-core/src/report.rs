//! Summaries and plain-text rendering of distribution results.
//!
//! Used by the CLI; kept in the core crate so any front end prints the same
//! table and chart.

use serde::{Deserialize, Serialize};

use crate::distribution::PeriodResult;

/// Buckets below this fraction of the average are counted (and marked) as dips.
const LOW_USAGE_FRACTION: f64 = 0.5;

/// Render `value` with exactly `precision` decimal digits.
pub fn format_number(value: f64, precision: u32) -> String {
    let formatted = format!("{:.*}", precision as usize, value);
    // -0.0 prints as "-0"
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}

/// Aggregate figures over one distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub total: f64,
    pub peak: f64,
    pub lowest: f64,
    pub average: f64,
    /// Buckets flagged as peak
    pub peak_count: usize,
    /// Buckets below half the average
    pub low_count: usize,
}

impl DistributionSummary {
    /// Summarize `results`; an empty slice gives all zeros.
    pub fn from_results(results: &[PeriodResult]) -> Self {
        if results.is_empty() {
            return Self {
                total: 0.0,
                peak: 0.0,
                lowest: 0.0,
                average: 0.0,
                peak_count: 0,
                low_count: 0,
            };
        }

        let total: f64 = results.iter().map(|r| r.value).sum();
        let peak = results.iter().map(|r| r.value).fold(f64::MIN, f64::max);
        let lowest = results.iter().map(|r| r.value).fold(f64::MAX, f64::min);
        let average = total / results.len() as f64;

        Self {
            total,
            peak,
            lowest,
            average,
            peak_count: results.iter().filter(|r| r.is_peak).count(),
            low_count: results
                .iter()
                .filter(|r| is_dip(r.value, average))
                .count(),
        }
    }
}

fn is_dip(value: f64, average: f64) -> bool {
    average > 0.0 && value < average * LOW_USAGE_FRACTION
}

/// Render results as a fixed-width table with a verified total footer.
///
/// `expected_total` is the meter delta the results must add up to.
pub fn render_table(results: &[PeriodResult], expected_total: f64, precision: u32) -> String {
    let summary = DistributionSummary::from_results(results);
    let rule = "─".repeat(72);

    let mut output = format!(
        "{:<6} {:>10}  {:<6} {:>12}  {:<7} {:<2} {:<8}\n",
        "Hour", "Usage", "", "Reading", "Status", "", "Target"
    );
    output.push_str(&rule);
    output.push('\n');

    for result in results {
        let marker = if result.is_peak {
            "▲ peak"
        } else if is_dip(result.value, summary.average) {
            "▼ dip"
        } else {
            ""
        };
        output.push_str(&format!(
            "{:<6} {:>10}  {:<6} {:>12}  {:<7} {:<2} {:<8}\n",
            result.hour_label,
            format_number(result.value, precision),
            marker,
            format_number(result.cumulative, precision),
            result.status.as_str(),
            result.trend.symbol(),
            result.target_range,
        ));
    }

    output.push_str(&rule);
    output.push('\n');

    let shown_total = format_number(summary.total, precision);
    let verified = shown_total == format_number(expected_total, precision);
    output.push_str(&format!(
        "Total {:>11}  {}\n",
        shown_total,
        if verified { "✓ Verified" } else { "✗ Mismatch" }
    ));
    output.push_str(&format!(
        "Peak {}  Lowest {}  Average {}  ({} peak, {} low)\n",
        format_number(summary.peak, precision),
        format_number(summary.lowest, precision),
        format_number(summary.average, precision),
        summary.peak_count,
        summary.low_count,
    ));
    output
}

/// Render results as an ASCII bar chart scaled to the largest bucket.
pub fn render_ascii_chart(results: &[PeriodResult], precision: u32) -> String {
    let mut output = String::from("\nUsage by Hour:\n");
    output.push_str(&"─".repeat(50));
    output.push('\n');

    for result in results {
        let bar_length = ((result.intensity / 100.0) * 30.0).round().clamp(0.0, 30.0) as usize;
        output.push_str(&format!(
            "{} {}{} {}{}\n",
            result.hour_label,
            "█".repeat(bar_length),
            " ".repeat(30 - bar_length),
            format_number(result.value, precision),
            if result.is_peak { " ▲" } else { "" },
        ));
    }

    output.push_str(&"─".repeat(50));
    output.push('\n');
    output
}
