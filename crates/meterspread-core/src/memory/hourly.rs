//! Per-hour running averages of observed weight share.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::WeightMemory;
use crate::error::MemoryError;

/// Running sum of shares observed for one hour of the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyStats {
    pub weight_sum: f64,
    pub sample_count: u64,
}

impl HourlyStats {
    /// Mean share, or None before the first sample.
    pub fn bias(&self) -> Option<f64> {
        if self.sample_count == 0 {
            None
        } else {
            Some(self.weight_sum / self.sample_count as f64)
        }
    }

    pub fn record(&mut self, share: f64) {
        self.weight_sum += share;
        self.sample_count += 1;
    }
}

/// Learned bias for every hour of the day.
///
/// Serializes as a JSON object keyed by hour, which is the layout persisted
/// in the key-value store:
///
/// ```json
/// { "11": { "weightSum": 0.42, "sampleCount": 3 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyMemory {
    hours: BTreeMap<u8, HourlyStats>,
}

impl HourlyMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, hour: u8) -> Option<&HourlyStats> {
        self.hours.get(&hour)
    }

    pub fn bias(&self, hour: u8) -> Option<f64> {
        self.hours.get(&hour).and_then(HourlyStats::bias)
    }

    /// Fold one observed share into the hour's running mean.
    pub fn record(&mut self, hour: u8, share: f64) -> Result<(), MemoryError> {
        if hour > 23 {
            return Err(MemoryError::InvalidHour(hour));
        }
        if !share.is_finite() {
            tracing::debug!(hour, share, "ignoring non-finite weight share");
            return Ok(());
        }
        self.hours.entry(hour).or_default().record(share);
        Ok(())
    }

    /// Hours that have at least one sample, in hour order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, &HourlyStats)> {
        self.hours
            .iter()
            .filter(|(_, stats)| stats.sample_count > 0)
            .map(|(hour, stats)| (*hour, stats))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    pub fn total_samples(&self) -> u64 {
        self.hours.values().map(|s| s.sample_count).sum()
    }

    pub fn clear(&mut self) {
        self.hours.clear();
    }

    /// Render the learned bias as an ASCII bar chart, one line per hour.
    pub fn render_ascii_chart(&self) -> String {
        let mut output = String::from("\nLearned Hourly Bias:\n");
        output.push_str(&"─".repeat(50));
        output.push('\n');

        let max_bias = self
            .entries()
            .filter_map(|(_, s)| s.bias())
            .fold(0.0_f64, f64::max);

        for hour in 0..24u8 {
            match self.stats(hour).and_then(|s| s.bias().map(|b| (b, s.sample_count))) {
                Some((bias, samples)) => {
                    let bar_length = if max_bias > 0.0 {
                        ((bias / max_bias) * 30.0).round() as usize
                    } else {
                        0
                    };
                    output.push_str(&format!(
                        "{:02}:00 {}{} {:>5.1}% ({} samples)\n",
                        hour,
                        "█".repeat(bar_length),
                        " ".repeat(30 - bar_length.min(30)),
                        bias * 100.0,
                        samples
                    ));
                }
                None => {
                    output.push_str(&format!("{:02}:00 {} -\n", hour, " ".repeat(30)));
                }
            }
        }

        output.push_str(&"─".repeat(50));
        output.push('\n');
        output
    }
}

impl WeightMemory for HourlyMemory {
    fn read(&self, hour: u8) -> Result<Option<f64>, MemoryError> {
        Ok(self.bias(hour))
    }

    fn write(&mut self, hour: u8, share: f64) -> Result<(), MemoryError> {
        self.record(hour, share)
    }
}
