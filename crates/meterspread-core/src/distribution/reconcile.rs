//! Exact-sum reconciliation.
//!
//! Values are handled as integer counts of `step = 10^-precision`, so the sum
//! of the quantized buckets is an integer comparison rather than a floating
//! point one. Floors are taken first; the missing steps then go to the buckets
//! that lost the largest fraction (largest-remainder method).

use rand::Rng;

use super::tuning::EngineConfig;
use super::types::Bucket;
use crate::error::DistributionError;

/// Guards `floor` against representation error such as 2.9999999999.
pub(crate) const FLOOR_EPSILON: f64 = 1e-9;

/// `10^precision` as a float.
pub fn step_factor(precision: u32) -> f64 {
    10f64.powi(precision as i32)
}

/// Round `value` to `precision` decimal digits.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = step_factor(precision);
    (value * factor).round() / factor
}

/// Convert a step count back to a value.
pub fn units_to_value(units: i64, precision: u32) -> f64 {
    units as f64 / step_factor(precision)
}

/// Quantize every bucket so `sum(final_units) == total_units`.
///
/// On overshoot, steps are removed from random buckets that hold more than
/// one step. If the iteration cap is reached first, the buckets keep their
/// best-effort values and `ReconciliationExhausted` is returned.
pub fn reconcile<R: Rng + ?Sized>(
    buckets: &mut [Bucket],
    total_units: i64,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), DistributionError> {
    let n = buckets.len();
    if n == 0 {
        return Ok(());
    }

    let weight_sum: f64 = buckets.iter().map(|b| b.raw_weight).sum();
    let uniform = !(weight_sum.is_finite() && weight_sum > 0.0);
    if uniform {
        tracing::debug!(error = %DistributionError::DegenerateWeights, "using an equal split");
    }

    for bucket in buckets.iter_mut() {
        let ideal = if uniform {
            total_units as f64 / n as f64
        } else {
            bucket.raw_weight / weight_sum * total_units as f64
        };
        let floored = (ideal + FLOOR_EPSILON).floor().max(0.0);
        bucket.final_units = floored as i64;
        bucket.fractional_remainder = (ideal - floored).max(0.0);
    }

    let assigned: i64 = buckets.iter().map(|b| b.final_units).sum();
    let missing = total_units - assigned;

    if missing > 0 {
        distribute_missing(buckets, missing);
    } else if missing < 0 {
        remove_overshoot(buckets, -missing, config.reconcile_iteration_cap, rng)?;
    }

    Ok(())
}

/// Largest remainder first, ties by position; cycles when `missing > n`.
fn distribute_missing(buckets: &mut [Bucket], missing: i64) {
    let n = buckets.len() as i64;

    let mut order: Vec<usize> = (0..buckets.len()).collect();
    order.sort_by(|&a, &b| {
        buckets[b]
            .fractional_remainder
            .total_cmp(&buckets[a].fractional_remainder)
    });

    let full_rounds = missing / n;
    let leftover = (missing % n) as usize;

    if full_rounds > 0 {
        for bucket in buckets.iter_mut() {
            bucket.final_units += full_rounds;
        }
    }
    for &i in order.iter().take(leftover) {
        buckets[i].final_units += 1;
    }
}

fn remove_overshoot<R: Rng + ?Sized>(
    buckets: &mut [Bucket],
    excess: i64,
    iteration_cap: usize,
    rng: &mut R,
) -> Result<(), DistributionError> {
    let mut remaining = excess;
    let mut iterations = 0;

    while remaining > 0 && iterations < iteration_cap {
        let i = rng.gen_range(0..buckets.len());
        if buckets[i].final_units > 1 {
            buckets[i].final_units -= 1;
            remaining -= 1;
        }
        iterations += 1;
    }

    if remaining > 0 {
        let err = DistributionError::ReconciliationExhausted {
            iterations,
            remaining_steps: remaining,
        };
        tracing::warn!(error = %err, "returning best-effort values");
        return Err(err);
    }

    Ok(())
}
