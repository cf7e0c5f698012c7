//! Latin hypercube sampling.
//!
//! Each axis is cut into `n` equal strata; a random permutation assigns one
//! stratum per point and a uniform jitter places the point inside it:
//!
//! ```text
//! u_i = (perm(i) + U_i) / n,   U_i ~ Uniform[0, 1)
//! ```

use super::{check_request, Bounds, Sample, Sampler};
use crate::error::McResult;
use crate::rng::SimRng;

/// Latin hypercube sampler over two dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatinHypercubeSampler;

impl LatinHypercubeSampler {
    /// Unit-square coordinates before rescaling, one `[u, v]` per point.
    #[must_use]
    pub fn unit_sample(rng: &mut SimRng, n_samples: usize) -> Vec<[f64; 2]> {
        let mut strata: [Vec<usize>; 2] = [(0..n_samples).collect(), (0..n_samples).collect()];
        for axis in &mut strata {
            rng.shuffle(axis);
        }

        let n = n_samples as f64;
        (0..n_samples)
            .map(|i| {
                let u = (strata[0][i] as f64 + rng.gen_f64()) / n;
                let v = (strata[1][i] as f64 + rng.gen_f64()) / n;
                [u, v]
            })
            .collect()
    }
}

impl Sampler for LatinHypercubeSampler {
    fn name(&self) -> &'static str {
        "latin-hypercube"
    }

    fn generate(&self, rng: &mut SimRng, bounds: &Bounds, n_samples: usize) -> McResult<Sample> {
        check_request(bounds, n_samples)?;

        Ok(Self::unit_sample(rng, n_samples)
            .into_iter()
            .map(|[u, v]| bounds.rescale(u, v))
            .collect())
    }
}
