//! Plain uniform random sampling.

use super::{check_request, Bounds, Sample, Sampler};
use crate::error::McResult;
use crate::rng::SimRng;

/// Independent uniform draws on each axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl Sampler for UniformSampler {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn generate(&self, rng: &mut SimRng, bounds: &Bounds, n_samples: usize) -> McResult<Sample> {
        check_request(bounds, n_samples)?;

        Ok((0..n_samples)
            .map(|_| {
                let u = rng.gen_f64();
                let v = rng.gen_f64();
                bounds.rescale(u, v)
            })
            .collect())
    }
}
