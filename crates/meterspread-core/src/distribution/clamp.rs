//! Scaling to the target total and the realism ceiling.

use rand::Rng;

use super::generator::draw;
use super::tuning::EngineConfig;
use super::types::Bucket;

/// Rescale raw weights so they sum to `total`.
///
/// Returns false when the weights were degenerate (zero, negative or
/// non-finite sum) and an equal split was used instead.
pub fn scale_to_total(buckets: &mut [Bucket], total: f64) -> bool {
    if buckets.is_empty() {
        return true;
    }

    let sum: f64 = buckets.iter().map(|b| b.raw_weight).sum();
    if !(sum.is_finite() && sum > 0.0) {
        let share = total / buckets.len() as f64;
        for bucket in buckets.iter_mut() {
            bucket.raw_weight = share;
        }
        return false;
    }

    let ratio = total / sum;
    for bucket in buckets.iter_mut() {
        bucket.raw_weight *= ratio;
    }
    true
}

/// Cap buckets above the realism ceiling and hand the excess to buckets with
/// headroom.
///
/// Expects weights already scaled to `total`. Skipped entirely when the
/// average bucket is at or above the ceiling, since no arrangement could keep
/// every bucket under it. Returns the number of cap/redistribute passes run.
pub fn clamp<R: Rng + ?Sized>(
    buckets: &mut [Bucket],
    total: f64,
    config: &EngineConfig,
    rng: &mut R,
) -> usize {
    let n = buckets.len();
    let ceiling = config.realism_ceiling;
    if n == 0 || total / n as f64 >= ceiling {
        return 0;
    }

    let headroom_limit = ceiling - config.headroom_margin;
    let mut passes = 0;

    while passes < config.max_clamp_passes {
        let mut pool = 0.0;
        let mut capped = vec![false; n];

        for (i, bucket) in buckets.iter_mut().enumerate() {
            if bucket.raw_weight > ceiling {
                let cap = (ceiling - draw(rng, config.clamp_jitter)).max(0.0);
                pool += bucket.raw_weight - cap;
                bucket.raw_weight = cap;
                capped[i] = true;
            }
        }

        if pool <= 0.0 {
            break;
        }
        passes += 1;

        let mut recipients: Vec<usize> = (0..n)
            .filter(|&i| !capped[i] && buckets[i].raw_weight < headroom_limit)
            .collect();
        if recipients.is_empty() {
            recipients = (0..n)
                .filter(|&i| !capped[i] && buckets[i].raw_weight < ceiling)
                .collect();
        }
        if recipients.is_empty() {
            recipients = (0..n).collect();
        }

        // Uneven random shares, weighted by how much room each bucket has left
        let shares: Vec<f64> = recipients
            .iter()
            .map(|&i| {
                let room = (ceiling - buckets[i].raw_weight).max(1e-6);
                room * rng.gen_range(0.5..1.5)
            })
            .collect();
        let share_sum: f64 = shares.iter().sum();

        for (&i, share) in recipients.iter().zip(&shares) {
            buckets[i].raw_weight += pool * share / share_sum;
        }

        tracing::debug!(pass = passes, pool, recipients = recipients.len(), "redistributed excess over ceiling");
    }

    passes
}
