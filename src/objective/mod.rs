//! The objective-function boundary between the engine and its harness.
//!
//! The engine never owns the instance, the budget or the bookkeeping of
//! results. It talks to an [`ObjectiveFunction`], which answers distance
//! queries, hands out the run's random source, counts evaluations and
//! decides when to stop.
//!
//! [`TspObjective`] is the reference implementation over an in-memory
//! [`DistanceMatrix`] with a [`Budget`]. It records the best tour and the
//! convergence history that statistics tooling reads after a run.

mod evaluator;
mod matrix;
mod types;

pub use evaluator::{Budget, Improvement, TspObjective};
pub use matrix::DistanceMatrix;
pub use types::ObjectiveFunction;
