//! Local smoothing of jagged neighbours.
//!
//! A pure weighted draw can put 49 next to 11. Both passes only move weight
//! inside a pair, so the pair total and the overall total are unchanged and
//! neither bucket leaves the interval spanned by the pair.

use super::tuning::EngineConfig;
use super::types::Bucket;

/// Run the adjacent pass followed by the block pass.
pub fn smooth(buckets: &mut [Bucket], config: &EngineConfig) {
    let adjacent = smooth_adjacent(buckets, config);
    let blocks = smooth_blocks(buckets, config);
    tracing::debug!(adjacent, blocks, "smoothed bucket pairs");
}

/// Consecutive pairs with at least one unconstrained bucket are pulled toward
/// their average when they differ by more than `adjacent_divergence` of it.
pub fn smooth_adjacent(buckets: &mut [Bucket], config: &EngineConfig) -> usize {
    let pull = config.adjacent_pull;
    let mut touched = 0;

    for i in 1..buckets.len() {
        let (left, right) = buckets.split_at_mut(i);
        let a = &mut left[i - 1];
        let b = &mut right[0];
        if a.is_constrained() && b.is_constrained() {
            continue;
        }

        let avg = (a.raw_weight + b.raw_weight) / 2.0;
        if avg <= 0.0 {
            continue;
        }
        if (a.raw_weight - b.raw_weight).abs() > config.adjacent_divergence * avg {
            a.raw_weight = (1.0 - pull) * a.raw_weight + pull * avg;
            b.raw_weight = (1.0 - pull) * b.raw_weight + pull * avg;
            touched += 1;
        }
    }

    touched
}

/// Disjoint pairs (0,1), (2,3), ... with the same peak classification are
/// pulled toward their midpoint when the split leaves `block_split`.
pub fn smooth_blocks(buckets: &mut [Bucket], config: &EngineConfig) -> usize {
    let pull = config.block_pull;
    let mut touched = 0;

    for pair in buckets.chunks_exact_mut(2) {
        let [a, b] = pair else { continue };
        if a.is_peak != b.is_peak {
            continue;
        }

        let total = a.raw_weight + b.raw_weight;
        if total <= 0.0 {
            continue;
        }
        if !config.block_split.contains(a.raw_weight / total) {
            let mid = total / 2.0;
            a.raw_weight = (1.0 - pull) * a.raw_weight + pull * mid;
            b.raw_weight = (1.0 - pull) * b.raw_weight + pull * mid;
            touched += 1;
        }
    }

    touched
}
