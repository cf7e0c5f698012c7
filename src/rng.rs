//! Deterministic random number generation.
//!
//! Implements PCG (Permuted Congruential Generator) with partitioned seeds
//! so that concurrent sweep tasks each draw from their own stream.
//!
//! # Reproducibility Guarantee
//!
//! Given the same master seed, all random number sequences will be
//! bitwise-identical across:
//! - Different runs
//! - Different platforms
//! - Different worker counts (via per-task stream partitioning)

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Golden-ratio increment separating the seeds of adjacent streams.
const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic, reproducible random number generator.
///
/// This is the injectable randomness source every sampler consumes. It
/// provides uniform reals in `[0, 1)`, uniform integers and slice shuffling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRng {
    /// Master seed for reproducibility.
    master_seed: u64,
    /// Current stream index for partitioning.
    stream: u64,
    /// Internal PCG state.
    rng: Pcg64,
}

impl SimRng {
    /// Create a new RNG with the given master seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            stream: 0,
            rng: Pcg64::seed_from_u64(master_seed),
        }
    }

    /// Create the generator for a single stream of a master seed.
    ///
    /// `SimRng::for_stream(seed, i)` yields the same sequence as the `i`-th
    /// element of `SimRng::new(seed).partition(i + 1)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mandelbrot_mc::rng::SimRng;
    ///
    /// let mut direct = SimRng::for_stream(7, 2);
    /// let mut partitioned = SimRng::new(7).partition(3).remove(2);
    /// assert_eq!(direct.gen_f64(), partitioned.gen_f64());
    /// ```
    #[must_use]
    pub fn for_stream(master_seed: u64, stream: u64) -> Self {
        let seed = master_seed.wrapping_add(stream.wrapping_mul(STREAM_STRIDE));
        Self {
            master_seed,
            stream,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Get the master seed.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Get current stream index.
    #[must_use]
    pub const fn stream(&self) -> u64 {
        self.stream
    }

    /// Create partitioned RNGs for parallel execution.
    ///
    /// Each partition gets an independent stream derived from the master seed,
    /// ensuring reproducibility regardless of execution order.
    #[must_use]
    pub fn partition(&mut self, n: usize) -> Vec<Self> {
        let partitions: Vec<Self> = (0..n)
            .map(|i| Self::for_stream(self.master_seed, self.stream + i as u64))
            .collect();

        self.stream += n as u64;
        partitions
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate a uniform index in `[0, n)`. Returns 0 when `n == 0`.
    pub fn gen_index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Generate a random u32.
    pub fn gen_u32(&mut self) -> u32 {
        self.rng.gen()
    }

    /// Shuffle a slice uniformly in place.
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Property: Same seed produces same sequence.
    #[test]
    fn test_reproducibility() {
        let mut rng1 = SimRng::new(42);
        let mut rng2 = SimRng::new(42);

        let seq1: Vec<f64> = (0..100).map(|_| rng1.gen_f64()).collect();
        let seq2: Vec<f64> = (0..100).map(|_| rng2.gen_f64()).collect();

        assert_eq!(seq1, seq2, "Same seed must produce identical sequences");
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = SimRng::new(42);
        let mut rng2 = SimRng::new(43);

        let seq1: Vec<f64> = (0..100).map(|_| rng1.gen_f64()).collect();
        let seq2: Vec<f64> = (0..100).map(|_| rng2.gen_f64()).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_partition_independence() {
        let mut rng = SimRng::new(42);
        let mut partitions = rng.partition(4);

        let seqs: Vec<Vec<f64>> = partitions
            .iter_mut()
            .map(|p| (0..10).map(|_| p.gen_f64()).collect())
            .collect();

        for i in 0..seqs.len() {
            for j in (i + 1)..seqs.len() {
                assert_ne!(seqs[i], seqs[j], "Partitions must be independent");
            }
        }
    }

    #[test]
    fn test_partition_stream_increment() {
        let mut rng = SimRng::new(42);
        let _ = rng.partition(4);
        assert_eq!(rng.stream(), 4);
        let second = rng.partition(3);
        assert_eq!(rng.stream(), 7);
        assert_eq!(second[0].stream(), 4);
    }

    #[test]
    fn test_for_stream_matches_partition() {
        let mut partitions = SimRng::new(99).partition(5);
        for (i, p) in partitions.iter_mut().enumerate() {
            let mut direct = SimRng::for_stream(99, i as u64);
            assert_eq!(direct.gen_u32(), p.gen_u32());
            assert_eq!(direct.stream(), i as u64);
            assert_eq!(direct.master_seed(), 99);
        }
    }

    #[test]
    fn test_unit_bounds() {
        let mut rng = SimRng::new(42);
        for _ in 0..1000 {
            let v = rng.gen_f64();
            assert!((0.0..1.0).contains(&v), "Value out of range: {v}");
        }
    }

    #[test]
    fn test_gen_index_bounds() {
        let mut rng = SimRng::new(5);
        for _ in 0..1000 {
            assert!(rng.gen_index(7) < 7);
        }
        assert_eq!(rng.gen_index(0), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SimRng::new(42);
        let mut values: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut values);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(values, sorted, "50 elements should not shuffle to identity");
    }

    #[test]
    fn test_serde_roundtrip_preserves_position() {
        let mut rng = SimRng::new(42);
        let _ = rng.gen_f64();
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SimRng = serde_json::from_str(&json).unwrap();
        assert_eq!(rng.gen_f64(), restored.gen_f64());
    }
}
