//! Two-dimensional sampling strategies.
//!
//! Every sampler draws points inside a rectangular [`Bounds`] from an
//! injected [`SimRng`]:
//! - Uniform: independent uniform draws per axis
//! - Latin hypercube: one jittered point per row and column stratum
//! - Scrambled Sobol: randomized low-discrepancy net (power-of-two sizes)
//! - Orthogonal array: orthogonal-array-based Latin hypercube

pub mod latin_hypercube;
pub mod orthogonal;
pub mod sobol;
pub mod uniform;

use serde::{Deserialize, Serialize};

use crate::error::{McError, McResult};
use crate::rng::SimRng;

pub use latin_hypercube::LatinHypercubeSampler;
pub use orthogonal::{Axis, OrthogonalArray, OrthogonalSampler, StratumAssignment};
pub use sobol::ScrambledSobolSampler;
pub use uniform::UniformSampler;

/// A single sample point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate (real axis for the Mandelbrot application).
    pub x: f64,
    /// Vertical coordinate (imaginary axis).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An ordered sequence of sample points.
pub type Sample = Vec<Point>;

/// Axis-aligned sampling region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound of the x axis.
    pub x_low: f64,
    /// Upper bound of the x axis.
    pub x_high: f64,
    /// Lower bound of the y axis.
    pub y_low: f64,
    /// Upper bound of the y axis.
    pub y_high: f64,
}

impl Bounds {
    /// Bounding box enclosing the Mandelbrot set.
    pub const MANDELBROT: Self = Self {
        x_low: -2.0,
        x_high: 1.0,
        y_low: -1.12,
        y_high: 1.12,
    };

    /// The unit square `[0, 1] x [0, 1]`.
    pub const UNIT: Self = Self {
        x_low: 0.0,
        x_high: 1.0,
        y_low: 0.0,
        y_high: 1.0,
    };

    /// Create new bounds.
    #[must_use]
    pub const fn new(x_low: f64, x_high: f64, y_low: f64, y_high: f64) -> Self {
        Self {
            x_low,
            x_high,
            y_low,
            y_high,
        }
    }

    /// Area of the bounding box.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.x_high - self.x_low) * (self.y_high - self.y_low)
    }

    /// Map unit-square coordinates onto the box.
    #[must_use]
    pub fn rescale(&self, u: f64, v: f64) -> Point {
        Point {
            x: (self.x_high - self.x_low) * u + self.x_low,
            y: (self.y_high - self.y_low) * v + self.y_low,
        }
    }

    /// Check whether a point lies inside the closed box.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        (self.x_low..=self.x_high).contains(&point.x) && (self.y_low..=self.y_high).contains(&point.y)
    }

    /// Validate that every bound is finite and each axis has positive width.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for non-finite or inverted bounds.
    pub fn validate(&self) -> McResult<()> {
        let all = [self.x_low, self.x_high, self.y_low, self.y_high];
        if all.iter().any(|b| !b.is_finite()) {
            return Err(McError::invalid_argument(format!(
                "bounds must be finite, got {self:?}"
            )));
        }
        if self.x_low >= self.x_high || self.y_low >= self.y_high {
            return Err(McError::invalid_argument(format!(
                "bounds must satisfy low < high on both axes, got {self:?}"
            )));
        }
        Ok(())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::MANDELBROT
    }
}

/// Capability interface for 2-D samplers.
///
/// Implementations may over-generate (return more than `n_samples` points);
/// callers that need exactly `n_samples` take a prefix.
pub trait Sampler: Send + Sync {
    /// Short, stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Draw a sample of (at least) `n_samples` points inside `bounds`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for `n_samples == 0`, invalid bounds, or a
    /// size the sampler cannot produce.
    fn generate(&self, rng: &mut SimRng, bounds: &Bounds, n_samples: usize) -> McResult<Sample>;
}

/// Selectable sampling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerKind {
    /// Pure uniform random sampling.
    Uniform,
    /// Latin hypercube sampling.
    LatinHypercube,
    /// Scrambled Sobol sequence.
    ScrambledSobol,
    /// Orthogonal-array-based Latin hypercube.
    #[default]
    Orthogonal,
}

impl SamplerKind {
    /// All sampler kinds, in presentation order.
    pub const ALL: [Self; 4] = [
        Self::Uniform,
        Self::LatinHypercube,
        Self::ScrambledSobol,
        Self::Orthogonal,
    ];

    /// Instantiate the sampler.
    #[must_use]
    pub fn build(self) -> Box<dyn Sampler> {
        match self {
            Self::Uniform => Box::new(UniformSampler),
            Self::LatinHypercube => Box::new(LatinHypercubeSampler),
            Self::ScrambledSobol => Box::new(ScrambledSobolSampler),
            Self::Orthogonal => Box::new(OrthogonalSampler),
        }
    }

    /// Whether the sampler only accepts power-of-two sample sizes.
    #[must_use]
    pub const fn requires_power_of_two(self) -> bool {
        matches!(self, Self::ScrambledSobol)
    }
}

impl std::fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uniform => "uniform",
            Self::LatinHypercube => "latin-hypercube",
            Self::ScrambledSobol => "scrambled-sobol",
            Self::Orthogonal => "orthogonal",
        };
        f.write_str(name)
    }
}

/// Shared argument check for all samplers.
pub(crate) fn check_request(bounds: &Bounds, n_samples: usize) -> McResult<()> {
    if n_samples == 0 {
        return Err(McError::invalid_argument("n_samples must be positive"));
    }
    bounds.validate()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mandelbrot_bounds_area() {
        let area = Bounds::MANDELBROT.area();
        assert!((area - 3.0 * 2.24).abs() < 1e-12);
    }

    #[test]
    fn test_rescale_corners() {
        let b = Bounds::MANDELBROT;
        let p = b.rescale(0.0, 0.0);
        assert_eq!(p, Point::new(-2.0, -1.12));
        let p = b.rescale(1.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 1.12).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_validate_rejects_inverted() {
        let b = Bounds::new(1.0, -1.0, 0.0, 1.0);
        assert!(b.validate().unwrap_err().is_invalid_argument());
        let b = Bounds::new(0.0, 1.0, 0.5, 0.5);
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_bounds_validate_rejects_non_finite() {
        let b = Bounds::new(f64::NAN, 1.0, 0.0, 1.0);
        assert!(b.validate().is_err());
        let b = Bounds::new(0.0, f64::INFINITY, 0.0, 1.0);
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_every_kind_rejects_zero_samples() {
        for kind in SamplerKind::ALL {
            let mut rng = SimRng::new(1);
            let err = kind.build().generate(&mut rng, &Bounds::UNIT, 0).unwrap_err();
            assert!(err.is_invalid_argument(), "{kind} accepted n_samples = 0");
        }
    }

    #[test]
    fn test_every_kind_stays_in_bounds() {
        for kind in SamplerKind::ALL {
            let mut rng = SimRng::new(3);
            let sample = kind
                .build()
                .generate(&mut rng, &Bounds::MANDELBROT, 64)
                .unwrap();
            assert!(sample.len() >= 64, "{kind} under-generated");
            assert!(sample.iter().all(|p| Bounds::MANDELBROT.contains(p)));
            assert!(sample.iter().all(Point::is_finite));
        }
    }

    #[test]
    fn test_sampler_kind_serde_names() {
        let yaml = serde_yaml::to_string(&SamplerKind::LatinHypercube).unwrap();
        assert!(yaml.contains("latin-hypercube"));
        let kind: SamplerKind = serde_yaml::from_str("scrambled-sobol").unwrap();
        assert_eq!(kind, SamplerKind::ScrambledSobol);
        assert_eq!(SamplerKind::default(), SamplerKind::Orthogonal);
    }

    #[test]
    fn test_sampler_kind_display_matches_name() {
        for kind in SamplerKind::ALL {
            assert_eq!(kind.to_string(), kind.build().name());
        }
    }
}
