//! Escape-time classification of complex points.
//!
//! # Governing Equation
//!
//! ```text
//! z_0 = 0,   z_{k+1} = z_k² + c
//! c ∈ M  ⇔  |z_k| stays bounded
//! ```
//!
//! A point is presumed in the set when its orbit survives the full
//! iteration budget without leaving the escape radius. This misses
//! slowly-escaping points near the boundary and is inherent to the method.

use serde::{Deserialize, Serialize};
use std::ops::Add;

use crate::error::{McError, McResult};
use crate::sampling::Point;

/// Double-precision complex number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Create a new complex number.
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Squared modulus `|z|²`.
    #[must_use]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// `z²`.
    #[must_use]
    pub fn square(self) -> Self {
        Self {
            re: self.re * self.re - self.im * self.im,
            im: 2.0 * self.re * self.im,
        }
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl From<Point> for Complex {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Outcome of iterating one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Last computed orbit value.
    pub final_value: Complex,
    /// Iterations survived, in `[0, max_iterations]`.
    pub iterations: u32,
}

impl Orbit {
    /// Whether the orbit survived the whole budget.
    #[must_use]
    pub const fn survived(&self, max_iterations: u32) -> bool {
        self.iterations == max_iterations
    }
}

/// Classifies complex points by escape time.
///
/// Implementations must be deterministic and side-effect free; they are
/// shared across sweep workers.
pub trait PointClassifier: Send + Sync {
    /// Iterate `c` for at most `max_iterations` steps.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for `max_iterations == 0`, or
    /// `ClassifierFailure` when the classifier cannot evaluate `c`.
    fn classify(&self, c: Complex, max_iterations: u32) -> McResult<Orbit>;
}

/// Default escape radius.
pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

/// Standard escape-time iteration for the Mandelbrot map.
///
/// Only constructed through `default` or `with_radius`, which keep the cached
/// squared radius in step with the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeTime {
    escape_radius: f64,
    radius_sqr: f64,
}

impl Default for EscapeTime {
    fn default() -> Self {
        Self {
            escape_radius: DEFAULT_ESCAPE_RADIUS,
            radius_sqr: DEFAULT_ESCAPE_RADIUS * DEFAULT_ESCAPE_RADIUS,
        }
    }
}

impl EscapeTime {
    /// Classifier with a custom escape radius.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the radius is not finite and positive.
    pub fn with_radius(escape_radius: f64) -> McResult<Self> {
        if !escape_radius.is_finite() || escape_radius <= 0.0 {
            return Err(McError::invalid_argument(format!(
                "escape radius must be finite and positive, got {escape_radius}"
            )));
        }
        Ok(Self {
            escape_radius,
            radius_sqr: escape_radius * escape_radius,
        })
    }

    /// Configured escape radius.
    #[must_use]
    pub const fn escape_radius(&self) -> f64 {
        self.escape_radius
    }
}

impl PointClassifier for EscapeTime {
    fn classify(&self, c: Complex, max_iterations: u32) -> McResult<Orbit> {
        if max_iterations == 0 {
            return Err(McError::invalid_argument("max_iterations must be positive"));
        }
        if !(c.re.is_finite() && c.im.is_finite()) {
            return Err(McError::classifier(format!("non-finite point {c:?}")));
        }

        let mut z = Complex::default();
        for i in 0..max_iterations {
            z = z.square() + c;
            if z.norm_sqr() > self.radius_sqr {
                return Ok(Orbit {
                    final_value: z,
                    iterations: i,
                });
            }
        }

        Ok(Orbit {
            final_value: z,
            iterations: max_iterations,
        })
    }
}
