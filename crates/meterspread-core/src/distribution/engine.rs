//! The distribution pipeline end to end.

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use super::assemble::assemble;
use super::clamp::{clamp, scale_to_total};
use super::generator::{buckets_for, generate};
use super::profile::UsageProfile;
use super::reconcile::{reconcile, step_factor, FLOOR_EPSILON};
use super::smooth::smooth;
use super::tuning::EngineConfig;
use super::types::{Bucket, DistributionRequest, PeriodResult, MAX_PRECISION};
use crate::error::DistributionError;
use crate::memory::{NoMemory, WeightMemory};

/// Totals above this many precision steps lose integer exactness in an f64.
const MAX_TOTAL_UNITS: f64 = 1e15;

/// Splits a known meter delta across time buckets.
#[derive(Debug, Clone, Default)]
pub struct UsageDistributor {
    config: EngineConfig,
}

impl UsageDistributor {
    /// Create a distributor with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a distributor with custom tuning.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the engine with a generator seeded from the config (or entropy).
    ///
    /// Returns an empty vector for any invalid request.
    pub fn distribute(
        &self,
        request: &DistributionRequest,
        memory: &mut dyn WeightMemory,
    ) -> Vec<PeriodResult> {
        self.distribute_with_rng(request, memory, &mut self.rng())
    }

    /// Like [`distribute`](Self::distribute), but reports invalid requests.
    pub fn distribute_checked(
        &self,
        request: &DistributionRequest,
        memory: &mut dyn WeightMemory,
    ) -> Result<Vec<PeriodResult>, DistributionError> {
        self.try_distribute(request, memory, &mut self.rng())
    }

    fn rng(&self) -> Mcg128Xsl64 {
        match self.config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        }
    }

    /// Run the engine with a caller-supplied random source.
    ///
    /// Returns an empty vector for any invalid request.
    pub fn distribute_with_rng<R: Rng + ?Sized>(
        &self,
        request: &DistributionRequest,
        memory: &mut dyn WeightMemory,
        rng: &mut R,
    ) -> Vec<PeriodResult> {
        match self.try_distribute(request, memory, rng) {
            Ok(results) => results,
            Err(e) => {
                tracing::debug!(error = %e, "distribution request rejected");
                Vec::new()
            }
        }
    }

    /// Run the engine, surfacing why a request was rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDivisions`, `InvalidRange`, `InvalidPrecision` or
    /// `ValueOutOfRange` for requests that cannot be computed. Recoverable
    /// conditions (degenerate weights, reconciliation exhaustion) are logged
    /// and never returned.
    pub fn try_distribute<R: Rng + ?Sized>(
        &self,
        request: &DistributionRequest,
        memory: &mut dyn WeightMemory,
        rng: &mut R,
    ) -> Result<Vec<PeriodResult>, DistributionError> {
        let total_units = validate(request)?;
        let total = request.total_target();
        let config = &self.config;

        let mut buckets = buckets_for(
            request.start_offset,
            request.bucket_count,
            request.profile.policy(),
        );

        // Nothing to spread: zeros everywhere, no draws
        if total_units == 0 {
            return Ok(assemble(&buckets, request, config));
        }

        generate(&mut buckets, request.profile, &*memory, config, rng);
        if !scale_to_total(&mut buckets, total) {
            tracing::debug!(error = %DistributionError::DegenerateWeights, "using an equal split");
        }
        let clamp_passes = clamp(&mut buckets, total, config, rng);
        if request.profile.is_volatile() {
            smooth(&mut buckets, config);
        }
        if let Err(e) = reconcile(&mut buckets, total_units, config, rng) {
            tracing::warn!(error = %e, "exact-sum reconciliation incomplete");
        }

        let results = assemble(&buckets, request, config);
        learn(memory, &results, &buckets, total);

        tracing::debug!(
            buckets = results.len(),
            total,
            clamp_passes,
            profile = %request.profile,
            "distribution complete"
        );
        Ok(results)
    }
}

/// Check a request and return its total as a count of precision steps.
fn validate(request: &DistributionRequest) -> Result<i64, DistributionError> {
    if request.bucket_count == 0 {
        return Err(DistributionError::InvalidDivisions {
            bucket_count: request.bucket_count,
        });
    }
    if !request.start_value.is_finite() || !request.end_value.is_finite() {
        return Err(DistributionError::ValueOutOfRange(format!(
            "readings must be finite (start {}, end {})",
            request.start_value, request.end_value
        )));
    }
    if request.end_value < request.start_value {
        return Err(DistributionError::InvalidRange {
            start: request.start_value,
            end: request.end_value,
        });
    }
    if request.precision > MAX_PRECISION {
        return Err(DistributionError::InvalidPrecision {
            precision: request.precision,
            max: MAX_PRECISION,
        });
    }

    // Floor so the residual left for the last bucket is always in [0, step)
    let units = (request.total_target() * step_factor(request.precision) + FLOOR_EPSILON).floor();
    if units > MAX_TOTAL_UNITS {
        return Err(DistributionError::ValueOutOfRange(format!(
            "total {} is too large at precision {}",
            request.total_target(),
            request.precision
        )));
    }
    Ok(units as i64)
}

/// Fold each bucket's share of the total into the weight memory.
///
/// Store failures stop learning for this run but never fail it.
fn learn(
    memory: &mut dyn WeightMemory,
    results: &[PeriodResult],
    buckets: &[Bucket],
    total: f64,
) {
    if total <= 0.0 {
        return;
    }
    for (result, bucket) in results.iter().zip(buckets) {
        if let Err(e) = memory.write(bucket.hour_of_day, result.value / total) {
            tracing::warn!(error = %e, hour = bucket.hour_of_day, "failed to update weight memory");
            return;
        }
    }
}

/// Split `end_value - start_value` across `bucket_count` hourly buckets with
/// default tuning, no learned memory and an entropy-seeded generator.
///
/// Returns an empty vector for invalid input.
pub fn distribute(
    start_value: f64,
    end_value: f64,
    bucket_count: usize,
    start_offset: u8,
    profile: UsageProfile,
    precision: u32,
) -> Vec<PeriodResult> {
    let request = DistributionRequest {
        start_value,
        end_value,
        bucket_count,
        start_offset,
        profile,
        precision,
    };
    UsageDistributor::new().distribute(&request, &mut NoMemory)
}
