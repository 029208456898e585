//! Usage distribution engine.
//!
//! Splits a known meter delta (`end - start`) across consecutive hourly
//! buckets so the result looks like plausible real usage while summing
//! exactly to the delta. The pipeline runs in stages:
//!
//! 1. weight policy (hard ranges or relative weights per hour)
//! 2. raw generation, blended with learned per-hour bias
//! 3. scaling to the total and the realism ceiling
//! 4. smoothing of jagged neighbours (volatile profiles only)
//! 5. exact-sum reconciliation in integer precision steps
//! 6. result assembly with cumulative readings and classification

mod assemble;
mod clamp;
mod engine;
mod generator;
mod profile;
mod reconcile;
mod smooth;
mod tuning;
mod types;

pub use engine::{distribute, UsageDistributor};
pub use profile::{range_or_weight, target_range, HourPolicy, TargetRange, UsageProfile, WeightPolicy};
pub use reconcile::{round_to, step_factor};
pub use tuning::{Band, EngineConfig};
pub use types::{
    Bucket, DistributionRequest, PeriodResult, Trend, UsageStatus, MAX_PRECISION,
};
