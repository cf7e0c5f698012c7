//! Error types for mandelbrot-mc.
//!
//! All fallible operations return `Result<T, McError>` instead of panicking.
//! Validation failures surface immediately to the caller of the failing
//! operation and are never retried.

use thiserror::Error;

/// Result type alias for mandelbrot-mc operations.
pub type McResult<T> = Result<T, McError>;

/// Unified error type for all mandelbrot-mc operations.
#[derive(Debug, Error)]
pub enum McError {
    // ===== Argument Errors =====
    /// Non-positive sizes or iteration budgets, malformed bounds, or a sample
    /// size a sampler cannot produce.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    // ===== Collaborator Errors =====
    /// A sampler failed to produce a usable sample.
    #[error("Sampler '{sampler}' failed: {message}")]
    SamplerFailure {
        /// Name of the failing sampler.
        sampler: String,
        /// Description of the failure.
        message: String,
    },

    /// The point classifier failed.
    #[error("Classifier failed: {message}")]
    ClassifierFailure {
        /// Description of the failure.
        message: String,
    },

    // ===== Scheduler Errors =====
    /// A sweep task failed under the fail-fast policy.
    #[error("Sweep aborted at parameter {parameter}: {source}")]
    TaskFailed {
        /// Value of the varied parameter for the failing task.
        parameter: u64,
        /// Underlying failure.
        #[source]
        source: Box<McError>,
    },

    /// The sweep was stopped by a shutdown signal before all tasks drained.
    #[error("Sweep cancelled before completion")]
    Cancelled,

    /// A worker thread panicked.
    #[error("Worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the panicking worker.
        worker: usize,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl McError {
    /// Create an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a sampler failure.
    #[must_use]
    pub fn sampler(sampler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SamplerFailure {
            sampler: sampler.into(),
            message: message.into(),
        }
    }

    /// Create a classifier failure.
    #[must_use]
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::ClassifierFailure {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap a task failure with the parameter that caused it.
    #[must_use]
    pub fn task_failed(parameter: u64, source: Self) -> Self {
        Self::TaskFailed {
            parameter,
            source: Box::new(source),
        }
    }

    /// Check if this error is an argument validation failure.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
