//! Population-derived pheromone information.
//!
//! In population-based ACO the pheromone on an edge is fully determined by
//! how many resident solutions use that edge. Instead of an `n × n` matrix
//! that is evaporated and reinforced, the store keeps, for every node, the
//! few neighbors that resident tours actually use together with a use count.
//! With `k` residents that is at most `k` (asymmetric) or `2k` (symmetric)
//! entries per node.
//!
//! Entering the population adds one unit to every edge of a tour; leaving it
//! removes exactly that unit again. No evaporation is needed.
//!
//! # References
//!
//! - Guntsch & Middendorf (2002), "A Population Based Approach for ACO"
//! - Oliveira et al. (2011), "A Detailed Analysis of the Population-based
//!   Ant Colony Optimization Algorithm for the TSP and the QAP"

mod counts;
mod store;
mod variants;

pub use store::{PheromoneMatrix, PheromoneScale, PheromoneStore};
pub use variants::{AsymmetricPheromones, SymmetricPheromones};
