//! Usage profiles and the per-hour weight policy.
//!
//! A profile decides which hours of the day carry more usage. Residential
//! usage additionally knows a handful of hours with explicit target ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named usage-shape policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageProfile {
    /// Household curve with morning, midday and afternoon peaks
    #[default]
    Residential,
    /// Office-hours curve
    Commercial,
    /// Near-equal shares across every hour
    Flat,
}

/// Explicit plausibility band for a known peak hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub min: f64,
    pub max: f64,
    /// Part of the designated peak sub-range
    pub peak: bool,
}

impl TargetRange {
    const fn new(min: f64, max: f64, peak: bool) -> Self {
        Self { min, max, peak }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Display form used in result tables, e.g. `"34 - 52"`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.min, self.max)
    }
}

/// What the weight policy says about a single hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HourPolicy {
    /// Draw inside an explicit range
    Range(TargetRange),
    /// Unconstrained hour with a relative base weight
    Weight(f64),
}

/// Weight policy resolved once per request.
pub type WeightPolicy = fn(u8) -> HourPolicy;

/// Known peak hours: early morning, midday, mid-afternoon.
pub fn target_range(hour: u8) -> Option<TargetRange> {
    match hour % 24 {
        5 => Some(TargetRange::new(15.0, 28.0, false)),
        6 => Some(TargetRange::new(15.0, 29.0, false)),
        11 | 12 => Some(TargetRange::new(34.0, 52.0, true)),
        15 | 16 => Some(TargetRange::new(22.0, 36.0, false)),
        _ => None,
    }
}

const RESIDENTIAL_WEIGHTS: [f64; 24] = [
    0.35, 0.30, 0.25, 0.25, 0.30, 0.60, // 00-05
    1.20, 1.50, 1.30, 1.00, 0.90, 1.00, // 06-11
    1.10, 0.90, 0.80, 0.85, 1.00, 1.30, // 12-17
    1.50, 1.40, 1.20, 1.00, 0.70, 0.50, // 18-23
];

const COMMERCIAL_WEIGHTS: [f64; 24] = [
    0.20, 0.20, 0.20, 0.20, 0.20, 0.30, // 00-05
    0.50, 0.90, 1.30, 1.50, 1.50, 1.40, // 06-11
    1.20, 1.40, 1.50, 1.40, 1.30, 1.10, // 12-17
    0.70, 0.40, 0.30, 0.25, 0.20, 0.20, // 18-23
];

const FLAT_WEIGHT: f64 = 1.0;

fn residential_policy(hour: u8) -> HourPolicy {
    match target_range(hour) {
        Some(range) => HourPolicy::Range(range),
        None => HourPolicy::Weight(RESIDENTIAL_WEIGHTS[usize::from(hour % 24)]),
    }
}

fn commercial_policy(hour: u8) -> HourPolicy {
    HourPolicy::Weight(COMMERCIAL_WEIGHTS[usize::from(hour % 24)])
}

fn flat_policy(_hour: u8) -> HourPolicy {
    HourPolicy::Weight(FLAT_WEIGHT)
}

impl UsageProfile {
    pub const ALL: [UsageProfile; 3] = [
        UsageProfile::Residential,
        UsageProfile::Commercial,
        UsageProfile::Flat,
    ];

    /// The hour policy for this profile.
    pub fn policy(self) -> WeightPolicy {
        match self {
            UsageProfile::Residential => residential_policy,
            UsageProfile::Commercial => commercial_policy,
            UsageProfile::Flat => flat_policy,
        }
    }

    /// Whether raw draws carry volatility and get smoothed afterwards.
    pub fn is_volatile(self) -> bool {
        !matches!(self, UsageProfile::Flat)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UsageProfile::Residential => "residential",
            UsageProfile::Commercial => "commercial",
            UsageProfile::Flat => "flat",
        }
    }
}

/// Resolve one hour of one profile; defined for every hour 0-23.
pub fn range_or_weight(hour: u8, profile: UsageProfile) -> HourPolicy {
    (profile.policy())(hour)
}

impl fmt::Display for UsageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" | "home" => Ok(UsageProfile::Residential),
            "commercial" | "office" => Ok(UsageProfile::Commercial),
            "flat" | "uniform" => Ok(UsageProfile::Flat),
            other => Err(format!(
                "unknown profile '{other}' (expected residential, commercial or flat)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_is_total_for_every_profile() {
        for profile in UsageProfile::ALL {
            for hour in 0..24u8 {
                match range_or_weight(hour, profile) {
                    HourPolicy::Range(range) => assert!(range.min < range.max),
                    HourPolicy::Weight(w) => assert!(w > 0.0),
                }
            }
        }
    }

    #[test]
    fn only_residential_honors_ranges() {
        assert!(matches!(
            range_or_weight(11, UsageProfile::Residential),
            HourPolicy::Range(_)
        ));
        assert!(matches!(
            range_or_weight(11, UsageProfile::Commercial),
            HourPolicy::Weight(_)
        ));
        assert_eq!(range_or_weight(11, UsageProfile::Flat), HourPolicy::Weight(1.0));
    }

    #[test]
    fn midday_is_the_designated_peak() {
        assert!(target_range(11).unwrap().peak);
        assert!(target_range(12).unwrap().peak);
        assert!(!target_range(5).unwrap().peak);
        assert!(!target_range(16).unwrap().peak);
        assert!(target_range(3).is_none());
    }

    #[test]
    fn flat_weights_are_uniform() {
        let weights: Vec<_> = (0..24u8)
            .map(|h| range_or_weight(h, UsageProfile::Flat))
            .collect();
        assert!(weights.iter().all(|w| *w == HourPolicy::Weight(1.0)));
    }

    #[test]
    fn commercial_favors_office_hours() {
        let at = |h| match range_or_weight(h, UsageProfile::Commercial) {
            HourPolicy::Weight(w) => w,
            HourPolicy::Range(_) => unreachable!(),
        };
        assert!(at(10) > at(2));
        assert!(at(14) > at(22));
    }

    #[test]
    fn range_label_and_midpoint() {
        let range = target_range(12).unwrap();
        assert_eq!(range.label(), "34 - 52");
        assert_eq!(range.midpoint(), 43.0);
    }

    #[test]
    fn parse_profile_names() {
        assert_eq!("Residential".parse::<UsageProfile>(), Ok(UsageProfile::Residential));
        assert_eq!("office".parse::<UsageProfile>(), Ok(UsageProfile::Commercial));
        assert_eq!(" flat ".parse::<UsageProfile>(), Ok(UsageProfile::Flat));
        assert!("industrial".parse::<UsageProfile>().is_err());
    }
}
