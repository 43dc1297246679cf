//! Error types for the solving engine.
//!
//! Configuration and setup problems are reported as [`PacoError`].
//! Violations of internal data-structure contracts (deleting a node that
//! was never in the pool, removing a tour from the pheromone store that
//! was never added) are programming errors and panic instead.

use thiserror::Error;

/// Errors returned by configuration validation and the engine entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PacoError {
    /// A named numeric parameter is outside its documented range.
    #[error("parameter '{name}' = {value} is outside [{min}, {max}]")]
    InvalidParameter {
        /// Parameter key, e.g. `"q0"`.
        name: String,
        /// Rejected value.
        value: f64,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },

    /// A parameter name that the engine does not know.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// The local search configuration is unusable.
    #[error("invalid local search configuration: {0}")]
    InvalidLocalSearch(String),

    /// The budget configuration is unusable.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    /// The instance has too few nodes for the engine.
    #[error("instance has {n} nodes, at least {min} are required")]
    InstanceTooSmall {
        /// Node count of the instance.
        n: usize,
        /// Minimum node count.
        min: usize,
    },

    /// A distance matrix could not be built.
    #[error("invalid distance matrix: {reason}")]
    InvalidDistanceMatrix {
        /// What is wrong with the input.
        reason: String,
    },

    /// `solve` was called without a preceding `begin_run`.
    #[error("solve called before begin_run")]
    RunNotStarted,

    /// The objective function's node count differs from the one the run
    /// was prepared for.
    #[error("run prepared for {expected} nodes, objective has {actual}")]
    DimensionMismatch {
        /// Node count given to `begin_run`.
        expected: usize,
        /// Node count seen by `solve`.
        actual: usize,
    },
}

impl PacoError {
    /// Creates an [`InvalidParameter`](PacoError::InvalidParameter) error.
    pub fn invalid_parameter(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            min,
            max,
        }
    }

    /// Creates an [`InvalidDistanceMatrix`](PacoError::InvalidDistanceMatrix) error.
    pub fn invalid_matrix(reason: impl Into<String>) -> Self {
        Self::InvalidDistanceMatrix {
            reason: reason.into(),
        }
    }
}
