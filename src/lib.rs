//! Population-based Ant Colony Optimization engine for the Traveling
//! Salesman Problem.
//!
//! The crate provides the solving core that experiment harnesses drive:
//!
//! - **PACO** ([`paco`]): ants construct tours guided by pheromone that is
//!   derived from a small population of resident solutions, with
//!   pluggable population update strategies.
//! - **Local search** ([`local`]): exhaustive k-opt for `2 <= k <= 7`,
//!   applied to every constructed tour when configured.
//! - **Pheromone store** ([`pheromone`]): compact per-node edge counts for
//!   symmetric and asymmetric instances.
//! - **Primitives**: a reproducible 48-bit LCG random source
//!   ([`random`]) and an O(1) unvisited-node pool ([`node_pool`]).
//!
//! # Architecture
//!
//! The engine never owns the instance or the budget. Everything it needs
//! from outside (distances, the random source, evaluation counting and
//! termination) goes through the [`objective::ObjectiveFunction`] trait;
//! [`objective::TspObjective`] is the reference implementation. Instance
//! parsing, statistics and reporting are left to consumers.

pub mod error;
pub mod local;
pub mod node_pool;
pub mod objective;
pub mod paco;
pub mod pheromone;
pub mod random;
pub mod tour;

pub use error::PacoError;
