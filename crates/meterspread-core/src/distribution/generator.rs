//! Raw weight generation.
//!
//! Draws an unnormalized weight for every bucket from the profile's hour
//! policy, day/night base ranges and a volatility multiplier, then nudges the
//! draw toward whatever the weight memory learned for that hour.

use rand::Rng;

use super::profile::{HourPolicy, UsageProfile, WeightPolicy};
use super::tuning::{Band, EngineConfig};
use super::types::Bucket;
use crate::memory::WeightMemory;

/// Uniform draw from `band`; a collapsed or inverted band yields its min.
pub(crate) fn draw<R: Rng + ?Sized>(rng: &mut R, band: Band) -> f64 {
    if band.max > band.min {
        rng.gen_range(band.min..band.max)
    } else {
        band.min
    }
}

/// True with probability `p`; out-of-range probabilities never panic.
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    p > 0.0 && rng.gen::<f64>() < p
}

/// Random multiplier applied to an unconstrained draw.
fn volatility<R: Rng + ?Sized>(config: &EngineConfig, bucket_count: usize, rng: &mut R) -> f64 {
    let band = if bucket_count < config.short_request_buckets {
        config.short_volatility
    } else {
        config.volatility
    };

    let mut multiplier = draw(rng, band);
    if chance(rng, config.spike_probability) {
        multiplier *= config.spike_multiplier;
    }
    if chance(rng, config.drop_probability) {
        multiplier *= config.drop_multiplier;
    }
    multiplier
        .max(config.volatility_limits.min)
        .min(config.volatility_limits.max)
}

/// Build the bucket list for a request: hour labels and explicit ranges only.
pub fn buckets_for(
    start_offset: u8,
    bucket_count: usize,
    policy: WeightPolicy,
) -> Vec<Bucket> {
    (0..bucket_count)
        .map(|i| {
            let hour = ((usize::from(start_offset) + i) % 24) as u8;
            match policy(hour) {
                HourPolicy::Range(range) => {
                    let mut bucket = Bucket::new(hour, Some(range));
                    bucket.is_peak = range.peak;
                    bucket
                }
                HourPolicy::Weight(_) => Bucket::new(hour, None),
            }
        })
        .collect()
}

/// Set `raw_weight` on every bucket.
pub fn generate<R: Rng + ?Sized>(
    buckets: &mut [Bucket],
    profile: UsageProfile,
    memory: &dyn WeightMemory,
    config: &EngineConfig,
    rng: &mut R,
) {
    let policy = profile.policy();
    let bucket_count = buckets.len();

    for bucket in buckets.iter_mut() {
        bucket.raw_weight = match policy(bucket.hour_of_day) {
            HourPolicy::Range(range) => draw(rng, Band::new(range.min, range.max)),
            HourPolicy::Weight(weight) if !profile.is_volatile() => weight,
            HourPolicy::Weight(weight) => {
                let base = if config.is_night(bucket.hour_of_day) {
                    draw(rng, config.night_range)
                } else {
                    draw(rng, config.day_range)
                };
                weight * base * volatility(config, bucket_count, rng)
            }
        };
    }

    if profile.is_volatile() {
        blend_learned_bias(buckets, memory, config);
    }
}

/// Blend each bucket with the bias learned for its hour.
///
/// Biases are shares of a past total, so they are made relative to the mean
/// bias of this request's hours and rescaled to the mean fresh weight before
/// blending.
fn blend_learned_bias(buckets: &mut [Bucket], memory: &dyn WeightMemory, config: &EngineConfig) {
    let mut cache: [Option<Option<f64>>; 24] = [None; 24];
    let mut read_failed = false;

    let biases: Vec<Option<f64>> = buckets
        .iter()
        .map(|bucket| {
            let slot = &mut cache[usize::from(bucket.hour_of_day % 24)];
            *slot.get_or_insert_with(|| {
                if read_failed {
                    return None;
                }
                match memory.read(bucket.hour_of_day) {
                    Ok(bias) => bias.filter(|b| b.is_finite() && *b > 0.0),
                    Err(e) => {
                        tracing::warn!(error = %e, "weight memory unavailable, ignoring learned bias");
                        read_failed = true;
                        None
                    }
                }
            })
        })
        .collect();

    let learned: Vec<f64> = biases.iter().flatten().copied().collect();
    if learned.is_empty() {
        return;
    }

    let mean_bias = learned.iter().sum::<f64>() / learned.len() as f64;
    let mean_raw = buckets.iter().map(|b| b.raw_weight).sum::<f64>() / buckets.len() as f64;
    let fresh = config.fresh_weight_blend.clamp(0.0, 1.0);

    for (bucket, bias) in buckets.iter_mut().zip(biases) {
        if let Some(bias) = bias {
            let learned_weight = bias / mean_bias * mean_raw;
            bucket.raw_weight = fresh * bucket.raw_weight + (1.0 - fresh) * learned_weight;
        }
    }

    tracing::debug!(
        learned_hours = learned.len(),
        mean_bias,
        "blended learned bias into raw weights"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoryError;
    use crate::memory::{HourlyMemory, NoMemory};
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(7)
    }

    #[test]
    fn residential_ranges_are_respected() {
        let config = EngineConfig::default();
        let policy = UsageProfile::Residential.policy();
        let mut buckets = buckets_for(11, 2, policy);
        generate(&mut buckets, UsageProfile::Residential, &NoMemory, &config, &mut rng());

        for bucket in &buckets {
            let range = bucket.constraint.unwrap();
            assert!(bucket.raw_weight >= range.min && bucket.raw_weight <= range.max);
            assert!(bucket.is_peak);
        }
    }

    #[test]
    fn flat_weights_are_constant() {
        let config = EngineConfig::default();
        let mut buckets = buckets_for(0, 24, UsageProfile::Flat.policy());
        generate(&mut buckets, UsageProfile::Flat, &NoMemory, &config, &mut rng());
        assert!(buckets.iter().all(|b| b.raw_weight == 1.0));
        assert!(buckets.iter().all(|b| b.constraint.is_none() && !b.is_peak));
    }

    #[test]
    fn unconstrained_draws_stay_within_bounds() {
        let config = EngineConfig::default();
        let mut buckets = buckets_for(0, 24, UsageProfile::Commercial.policy());
        generate(&mut buckets, UsageProfile::Commercial, &NoMemory, &config, &mut rng());

        // weight * base * volatility, all positive and bounded
        for bucket in &buckets {
            assert!(bucket.raw_weight > 0.0);
            assert!(bucket.raw_weight <= 1.5 * 12.0 * 3.0);
        }
    }

    #[test]
    fn volatility_respects_limits() {
        let config = EngineConfig {
            spike_probability: 1.0,
            spike_multiplier: 10.0,
            ..EngineConfig::default()
        };
        let mut r = rng();
        for _ in 0..100 {
            let m = volatility(&config, 2, &mut r);
            assert!(config.volatility_limits.contains(m));
        }
    }

    #[test]
    fn draw_handles_collapsed_band() {
        let mut r = rng();
        assert_eq!(draw(&mut r, Band::new(3.0, 3.0)), 3.0);
        assert_eq!(draw(&mut r, Band::new(5.0, 1.0)), 5.0);
        assert!(!chance(&mut r, 0.0));
        assert!(!chance(&mut r, f64::NAN));
    }

    #[test]
    fn learned_bias_pulls_weights() {
        let config = EngineConfig {
            night_range: Band::new(2.0, 2.0),
            volatility: Band::new(1.0, 1.0),
            short_volatility: Band::new(1.0, 1.0),
            spike_probability: 0.0,
            drop_probability: 0.0,
            ..EngineConfig::default()
        };
        let policy = UsageProfile::Commercial.policy();

        let mut memory = HourlyMemory::new();
        memory.record(2, 0.9).unwrap();
        memory.record(3, 0.1).unwrap();

        let mut plain = buckets_for(2, 2, policy);
        generate(&mut plain, UsageProfile::Commercial, &NoMemory, &config, &mut rng());
        let mut biased = buckets_for(2, 2, policy);
        generate(&mut biased, UsageProfile::Commercial, &memory, &config, &mut rng());

        assert_eq!(plain[0].raw_weight, plain[1].raw_weight);
        assert!(biased[0].raw_weight > biased[1].raw_weight);
        // 70% of 0.4 plus 30% of (0.9 / 0.5) * 0.4
        assert!((biased[0].raw_weight - 0.496).abs() < 1e-9);
    }

    struct BrokenMemory;

    impl WeightMemory for BrokenMemory {
        fn read(&self, hour: u8) -> Result<Option<f64>, MemoryError> {
            Err(MemoryError::InvalidHour(hour))
        }

        fn write(&mut self, hour: u8, _share: f64) -> Result<(), MemoryError> {
            Err(MemoryError::InvalidHour(hour))
        }
    }

    #[test]
    fn memory_failure_is_treated_as_no_bias() {
        let config = EngineConfig::default();
        let policy = UsageProfile::Residential.policy();

        let mut plain = buckets_for(8, 6, policy);
        generate(&mut plain, UsageProfile::Residential, &NoMemory, &config, &mut rng());
        let mut broken = buckets_for(8, 6, policy);
        generate(&mut broken, UsageProfile::Residential, &BrokenMemory, &config, &mut rng());

        assert_eq!(plain, broken);
    }
}
