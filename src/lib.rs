//! # mandelbrot-mc
//!
//! Monte Carlo estimation of the area of the Mandelbrot set.
//!
//! - Samplers: uniform, Latin hypercube, scrambled Sobol and orthogonal
//!   (Latin hypercube over a strength-2 orthogonal array)
//! - Escape-time classification with a configurable iteration budget
//! - Parallel parameter sweeps with per-task reproducible random streams
//!
//! ## Example
//!
//! ```rust
//! use mandelbrot_mc::prelude::*;
//!
//! let classifier = EscapeTime::default();
//! let estimator = MonteCarloEstimator::new(&OrthogonalSampler, &classifier);
//! let area = estimator.estimate(4096, 100, &mut SimRng::new(42)).unwrap();
//! assert!(area > 1.3 && area < 1.7);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod estimator;
pub mod rng;
pub mod sampling;
pub mod scheduler;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Complex, EscapeTime, Orbit, PointClassifier};
    pub use crate::config::{ExperimentConfig, ExperimentConfigBuilder};
    pub use crate::error::{McError, McResult};
    pub use crate::estimator::{AreaEstimate, MonteCarloEstimator};
    pub use crate::rng::SimRng;
    pub use crate::sampling::{
        Bounds, LatinHypercubeSampler, OrthogonalSampler, Point, Sampler, SamplerKind,
        ScrambledSobolSampler, UniformSampler,
    };
    pub use crate::scheduler::{
        ExperimentScheduler, FailurePolicy, FixedConfig, ShutdownSignal, SweepKind, SweepReport,
        SweepRequest, SweepSummary,
    };
}

/// Re-export for public API
pub use error::{McError, McResult};
