//! Experiment configuration with YAML schema and validation.
//!
//! Mistakes are caught in two passes:
//! - Schema and range checks via serde and `validator`
//! - Semantic checks that span fields (Sobol sample sizes, bounds ordering)
//!
//! # Example
//!
//! ```yaml
//! seed: 42
//! workers: 4
//! sampler: orthogonal
//! sample_size: 10000
//! max_iterations: 256
//! sweep:
//!   kind: max-iterations
//!   values: [10, 100, 1000]
//!   repeats: 5
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use validator::Validate;

use crate::classifier::{EscapeTime, DEFAULT_ESCAPE_RADIUS};
use crate::error::{McError, McResult};
use crate::sampling::{Bounds, Sampler, SamplerKind};
use crate::scheduler::{
    default_workers, ExperimentScheduler, FailurePolicy, FixedConfig, SweepKind, SweepRequest,
    MAX_TASKS,
};

/// Top-level experiment configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Master seed for every task stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Worker threads.
    #[validate(range(min = 1))]
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Point sampler.
    #[serde(default)]
    pub sampler: SamplerKind,

    /// Sampling box in the complex plane.
    #[serde(default)]
    pub bounds: Bounds,

    /// Points per estimate when not swept.
    #[validate(range(min = 1))]
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Iteration budget when not swept.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Escape radius of the classifier.
    #[serde(default = "default_escape_radius")]
    pub escape_radius: f64,

    /// Behavior when a task fails.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Parameter sweep.
    #[validate(nested)]
    pub sweep: SweepConfig,
}

const fn default_seed() -> u64 {
    42
}

const fn default_sample_size() -> usize {
    10_000
}

const fn default_max_iterations() -> u32 {
    256
}

const fn default_escape_radius() -> f64 {
    DEFAULT_ESCAPE_RADIUS
}

/// Sweep section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Which input is varied.
    pub kind: SweepKind,
    /// Values of the varied input.
    #[validate(length(min = 1))]
    pub values: Vec<u64>,
    /// Estimates per value; ignored by `runs` sweeps.
    #[validate(range(min = 1))]
    #[serde(default = "default_repeats")]
    pub repeats: u32,
}

const fn default_repeats() -> u32 {
    1
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            kind: SweepKind::MaxIterations,
            values: vec![10, 100, 1000],
            repeats: 5,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            workers: default_workers(),
            sampler: SamplerKind::default(),
            bounds: Bounds::default(),
            sample_size: default_sample_size(),
            max_iterations: default_max_iterations(),
            escape_radius: default_escape_radius(),
            failure_policy: FailurePolicy::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> McResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> McResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> McResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for range violations and `Config` for
    /// inconsistent fields.
    pub fn check(&self) -> McResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> McResult<()> {
        self.bounds
            .validate()
            .map_err(|e| McError::config(e.to_string()))?;

        if !self.escape_radius.is_finite() || self.escape_radius <= 0.0 {
            return Err(McError::config(format!(
                "escape_radius must be finite and positive, got {}",
                self.escape_radius
            )));
        }

        let values = &self.sweep.values;
        if values.contains(&0) {
            return Err(McError::config("sweep values must be positive"));
        }
        let distinct: BTreeSet<u64> = values.iter().copied().collect();
        if distinct.len() != values.len() {
            return Err(McError::config(format!(
                "sweep values must be distinct, got {values:?}"
            )));
        }
        if self.sweep.kind == SweepKind::MaxIterations {
            if let Some(v) = values.iter().find(|&&v| v > u64::from(u32::MAX)) {
                return Err(McError::config(format!("max_iterations {v} exceeds u32")));
            }
        }
        let total = self.to_request().task_count();
        if total > MAX_TASKS {
            return Err(McError::config(format!(
                "sweep expands to {total} tasks, limit is {MAX_TASKS}"
            )));
        }

        if self.sampler.requires_power_of_two() {
            let sizes: Vec<u64> = if self.sweep.kind == SweepKind::SampleSize {
                values.clone()
            } else {
                vec![self.sample_size as u64]
            };
            if let Some(n) = sizes.iter().find(|n| !n.is_power_of_two()) {
                return Err(McError::config(format!(
                    "sampler {} needs power-of-two sample sizes, got {n}",
                    self.sampler
                )));
            }
        }

        Ok(())
    }

    /// Sweep request described by this configuration.
    #[must_use]
    pub fn to_request(&self) -> SweepRequest {
        SweepRequest::new(self.sweep.kind, self.sweep.values.clone(), self.sweep.repeats)
    }

    /// Inputs held constant across the sweep.
    #[must_use]
    pub const fn fixed_config(&self) -> FixedConfig {
        FixedConfig {
            sample_size: self.sample_size,
            max_iterations: self.max_iterations,
            bounds: self.bounds,
        }
    }

    /// Scheduler configured with this experiment's workers, seed and policy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `workers == 0`.
    pub fn scheduler(&self) -> McResult<ExperimentScheduler> {
        Ok(ExperimentScheduler::new(self.workers)?
            .with_seed(self.seed)
            .with_failure_policy(self.failure_policy))
    }

    /// Classifier with the configured escape radius.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an invalid radius.
    pub fn classifier(&self) -> McResult<EscapeTime> {
        EscapeTime::with_radius(self.escape_radius)
    }

    /// Sampler selected by this configuration.
    #[must_use]
    pub fn sampler(&self) -> Box<dyn Sampler> {
        self.sampler.build()
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct ExperimentConfigBuilder {
    seed: Option<u64>,
    workers: Option<usize>,
    sampler: Option<SamplerKind>,
    sample_size: Option<usize>,
    max_iterations: Option<u32>,
    failure_policy: Option<FailurePolicy>,
    sweep: Option<SweepConfig>,
}

impl ExperimentConfigBuilder {
    /// Set the master seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the worker count.
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the sampler.
    #[must_use]
    pub const fn sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the fixed sample size.
    #[must_use]
    pub const fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Set the fixed iteration budget.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Set the sweep.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec isn't const-droppable
    pub fn sweep(mut self, kind: SweepKind, values: Vec<u64>, repeats: u32) -> Self {
        self.sweep = Some(SweepConfig {
            kind,
            values,
            repeats,
        });
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ExperimentConfig {
        let mut config = ExperimentConfig::default();

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(sampler) = self.sampler {
            config.sampler = sampler;
        }
        if let Some(sample_size) = self.sample_size {
            config.sample_size = sample_size;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(policy) = self.failure_policy {
            config.failure_policy = policy;
        }
        if let Some(sweep) = self.sweep {
            config.sweep = sweep;
        }

        config
    }
}
