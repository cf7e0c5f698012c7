//! Scrambled two-dimensional Sobol sequence.
//!
//! Points are generated in Gray code order from 32-bit direction numbers:
//!
//! ```text
//! x_i = x_{i-1} XOR v[ctz(i)],   x_0 = 0
//! ```
//!
//! Randomization applies a random lower-triangular binary matrix to every
//! direction number (linear matrix scramble) and XORs a random digital shift
//! into every point. Both keep the `(t, m, 2)`-net structure of the first
//! `2^m` points, so sample sizes must be powers of two.

use super::{check_request, Bounds, Sample, Sampler};
use crate::error::{McError, McResult};
use crate::rng::SimRng;

/// Number of bits in direction numbers (u32).
const BITS: usize = 32;

/// Largest supported sample size.
const MAX_POINTS: usize = 1 << 31;

/// 2^-32, maps a 32-bit fraction onto [0, 1).
const SCALE: f64 = 1.0 / 4_294_967_296.0;

/// Direction numbers for both dimensions.
static DIRECTIONS: [[u32; BITS]; 2] = [van_der_corput(), second_dimension()];

/// Dimension 0: van der Corput base 2, `v[c] = 1 << (31 - c)`.
const fn van_der_corput() -> [u32; BITS] {
    let mut v = [0u32; BITS];
    let mut c = 0usize;
    while c < BITS {
        v[c] = 1u32 << (31 - c as u32);
        c += 1;
    }
    v
}

/// Dimension 1: Joe-Kuo parameters s = 1, a = 0, m = [1].
const fn second_dimension() -> [u32; BITS] {
    let mut v = [0u32; BITS];
    v[0] = 1u32 << 31;
    let mut c = 1usize;
    while c < BITS {
        v[c] = v[c - 1] ^ (v[c - 1] >> 1);
        c += 1;
    }
    v
}

/// Scrambled Sobol sampler.
///
/// `n_samples` must be a power of two; other sizes are rejected rather than
/// rounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrambledSobolSampler;

impl ScrambledSobolSampler {
    /// Scrambled unit-square points, one `[u, v]` per point.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_samples` is not a power of two or is
    /// larger than 2^31.
    pub fn unit_sample(rng: &mut SimRng, n_samples: usize) -> McResult<Vec<[f64; 2]>> {
        if !n_samples.is_power_of_two() || n_samples > MAX_POINTS {
            return Err(McError::invalid_argument(format!(
                "n_samples not a power of 2: {n_samples} (required for generating Sobol sequence)"
            )));
        }

        let mut directions = [[0u32; BITS]; 2];
        let mut shifts = [0u32; 2];
        for (dim, (scrambled, shift)) in directions.iter_mut().zip(shifts.iter_mut()).enumerate() {
            *scrambled = scramble(rng, &DIRECTIONS[dim]);
            *shift = rng.gen_u32();
        }

        let mut x = [0u32; 2];
        let mut points = Vec::with_capacity(n_samples);
        for i in 0..n_samples {
            if i > 0 {
                let c = i.trailing_zeros() as usize;
                x[0] ^= directions[0][c];
                x[1] ^= directions[1][c];
            }
            points.push([
                f64::from(x[0] ^ shifts[0]) * SCALE,
                f64::from(x[1] ^ shifts[1]) * SCALE,
            ]);
        }
        Ok(points)
    }
}

/// Apply a random unit lower-triangular binary matrix to each direction number.
///
/// Digit `r` (bit `31 - r`) of the output is the parity of the input digits
/// `0..=r` selected by row `r` of the matrix.
fn scramble(rng: &mut SimRng, directions: &[u32; BITS]) -> [u32; BITS] {
    let mut rows = [0u32; BITS];
    for (r, row) in rows.iter_mut().enumerate() {
        let below_diagonal = if r == 0 { 0 } else { u32::MAX << (BITS - r) };
        *row = (rng.gen_u32() & below_diagonal) | (1u32 << (31 - r));
    }

    let mut out = [0u32; BITS];
    for (v, o) in directions.iter().zip(out.iter_mut()) {
        for (r, row) in rows.iter().enumerate() {
            if (v & row).count_ones() & 1 == 1 {
                *o |= 1u32 << (31 - r);
            }
        }
    }
    out
}

impl Sampler for ScrambledSobolSampler {
    fn name(&self) -> &'static str {
        "scrambled-sobol"
    }

    fn generate(&self, rng: &mut SimRng, bounds: &Bounds, n_samples: usize) -> McResult<Sample> {
        check_request(bounds, n_samples)?;

        Ok(Self::unit_sample(rng, n_samples)?
            .into_iter()
            .map(|[u, v]| bounds.rescale(u, v))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        let mut rng = SimRng::new(42);
        let err = ScrambledSobolSampler
            .generate(&mut rng, &Bounds::MANDELBROT, 100)
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_accepts_power_of_two() {
        let mut rng = SimRng::new(42);
        let sample = ScrambledSobolSampler
            .generate(&mut rng, &Bounds::MANDELBROT, 128)
            .unwrap();
        assert_eq!(sample.len(), 128);
        assert!(sample.iter().all(|p| Bounds::MANDELBROT.contains(p)));
    }

    #[test]
    fn test_single_point_is_power_of_two() {
        let mut rng = SimRng::new(42);
        let sample = ScrambledSobolSampler
            .generate(&mut rng, &Bounds::UNIT, 1)
            .unwrap();
        assert_eq!(sample.len(), 1);
    }

    #[test]
    fn test_unscrambled_directions() {
        assert_eq!(DIRECTIONS[0][0], 0x8000_0000);
        assert_eq!(DIRECTIONS[0][1], 0x4000_0000);
        assert_eq!(DIRECTIONS[1][0], 0x8000_0000);
        assert_eq!(DIRECTIONS[1][1], 0xC000_0000);
        assert_eq!(DIRECTIONS[1][2], 0xA000_0000);
    }

    /// A scrambled (0, m, 2)-net has exactly one point in every elementary
    /// interval of area 2^-m; check the square grid and both slab shapes.
    #[test]
    fn test_scrambled_net_is_stratified() {
        let mut rng = SimRng::new(7);
        let n = 256;
        let points = ScrambledSobolSampler::unit_sample(&mut rng, n).unwrap();

        for (cols, rows) in [(16usize, 16usize), (256, 1), (1, 256), (64, 4)] {
            let mut hits = vec![0usize; cols * rows];
            for p in &points {
                let cx = (p[0] * cols as f64) as usize;
                let cy = (p[1] * rows as f64) as usize;
                hits[cy * cols + cx] += 1;
            }
            assert!(
                hits.iter().all(|&h| h == 1),
                "{cols}x{rows} boxes not hit exactly once"
            );
        }
    }

    #[test]
    fn test_scramble_keeps_leading_digit_structure() {
        let mut rng = SimRng::new(3);
        let scrambled = scramble(&mut rng, &DIRECTIONS[0]);
        // Unit diagonal: the highest set bit of v[c] stays at digit c.
        for (c, v) in scrambled.iter().enumerate() {
            assert_eq!(v.leading_zeros() as usize, c);
        }
    }

    #[test]
    fn test_different_seeds_scramble_differently() {
        let a = ScrambledSobolSampler::unit_sample(&mut SimRng::new(1), 16).unwrap();
        let b = ScrambledSobolSampler::unit_sample(&mut SimRng::new(2), 16).unwrap();
        assert_ne!(a, b);
    }
}
