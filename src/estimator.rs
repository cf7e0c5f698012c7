//! Monte Carlo area estimation.
//!
//! # Estimator
//!
//! ```text
//! Â = |B| · (1/n) Σ I(iterations(c_i) = max_iterations)
//! SE(Â) = |B| · sqrt(p̂ (1 - p̂) / n)
//! ```
//!
//! where `B` is the sampling box and `c_i` are drawn by a pluggable
//! [`Sampler`]. Given a seeded [`SimRng`], the estimate is deterministic.

use serde::{Deserialize, Serialize};

use crate::classifier::{Complex, PointClassifier};
use crate::error::{McError, McResult};
use crate::rng::SimRng;
use crate::sampling::{Bounds, Sampler};

/// Result of a single area estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEstimate {
    /// Estimated area.
    pub area: f64,
    /// Points presumed inside the set.
    pub in_set: usize,
    /// Points classified.
    pub sample_size: usize,
    /// `in_set / sample_size`.
    pub fraction: f64,
    /// Binomial standard error of the area.
    pub std_error: f64,
    /// 95% confidence interval (area ± 1.96 * `std_error`).
    pub confidence_interval: (f64, f64),
}

impl AreaEstimate {
    fn new(in_set: usize, sample_size: usize, box_area: f64) -> Self {
        let n = sample_size as f64;
        let fraction = in_set as f64 / n;
        let area = box_area * fraction;
        let std_error = box_area * (fraction * (1.0 - fraction) / n).sqrt();
        let ci_half = 1.96 * std_error;
        Self {
            area,
            in_set,
            sample_size,
            fraction,
            std_error,
            confidence_interval: (area - ci_half, area + ci_half),
        }
    }

    /// Check if value is within the confidence interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.confidence_interval.0 && value <= self.confidence_interval.1
    }
}

/// Monte Carlo estimator of the Mandelbrot set area.
pub struct MonteCarloEstimator<'a> {
    sampler: &'a dyn Sampler,
    classifier: &'a dyn PointClassifier,
    bounds: Bounds,
}

impl std::fmt::Debug for MonteCarloEstimator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonteCarloEstimator")
            .field("sampler", &self.sampler.name())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<'a> MonteCarloEstimator<'a> {
    /// Estimator over the default Mandelbrot box.
    #[must_use]
    pub fn new(sampler: &'a dyn Sampler, classifier: &'a dyn PointClassifier) -> Self {
        Self {
            sampler,
            classifier,
            bounds: Bounds::MANDELBROT,
        }
    }

    /// Use a different sampling box.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sampling box.
    #[must_use]
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Estimate the area from `sample_size` points.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mandelbrot_mc::classifier::EscapeTime;
    /// use mandelbrot_mc::estimator::MonteCarloEstimator;
    /// use mandelbrot_mc::rng::SimRng;
    /// use mandelbrot_mc::sampling::OrthogonalSampler;
    ///
    /// let classifier = EscapeTime::default();
    /// let estimator = MonteCarloEstimator::new(&OrthogonalSampler, &classifier);
    /// let area = estimator.estimate(10_000, 200, &mut SimRng::new(42)).unwrap();
    /// assert!((area - 1.51).abs() < 0.1);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero `sample_size` or
    /// `max_iterations`; sampler and classifier failures propagate unchanged.
    pub fn estimate(
        &self,
        sample_size: usize,
        max_iterations: u32,
        rng: &mut SimRng,
    ) -> McResult<f64> {
        self.estimate_detailed(sample_size, max_iterations, rng)
            .map(|estimate| estimate.area)
    }

    /// Estimate the area and report the counts behind it.
    ///
    /// # Errors
    ///
    /// See [`MonteCarloEstimator::estimate`].
    pub fn estimate_detailed(
        &self,
        sample_size: usize,
        max_iterations: u32,
        rng: &mut SimRng,
    ) -> McResult<AreaEstimate> {
        if sample_size == 0 {
            return Err(McError::invalid_argument("sample_size must be positive"));
        }
        if max_iterations == 0 {
            return Err(McError::invalid_argument("max_iterations must be positive"));
        }

        let sample = self.sampler.generate(rng, &self.bounds, sample_size)?;
        if sample.len() < sample_size {
            return Err(McError::sampler(
                self.sampler.name(),
                format!("returned {} points, {sample_size} requested", sample.len()),
            ));
        }

        let mut in_set = 0usize;
        for point in &sample[..sample_size] {
            if !point.is_finite() {
                return Err(McError::sampler(
                    self.sampler.name(),
                    format!("non-finite point {point:?}"),
                ));
            }
            let orbit = self.classifier.classify(Complex::from(*point), max_iterations)?;
            if orbit.survived(max_iterations) {
                in_set += 1;
            }
        }

        let estimate = AreaEstimate::new(in_set, sample_size, self.bounds.area());
        tracing::trace!(
            sampler = self.sampler.name(),
            sample_size,
            max_iterations,
            in_set,
            area = estimate.area,
            "area estimate"
        );
        Ok(estimate)
    }
}
