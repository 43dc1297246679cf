//! Population-based Ant Colony Optimization (PACO) for the TSP.
//!
//! Ants build tours node by node. At each step an ant either takes the
//! unvisited node with the highest `tau^alpha * eta^beta` score (with
//! probability `q0`) or samples one in proportion to that score. The
//! pheromone `tau` is not an evaporating matrix but is derived from a small
//! population of resident tours: after every round of `m` ants the round's
//! best may enter the population, and a leaving resident takes its
//! pheromone with it.
//!
//! # References
//!
//! - Guntsch & Middendorf (2002), "A Population Based Approach for ACO"
//! - Dorigo & Gambardella (1997), "Ant Colony System: A Cooperative
//!   Learning Approach to the Traveling Salesman Problem"

mod config;
mod construction;
mod runner;
mod types;
mod update;

pub use config::{InitialPopulation, PacoConfig, ParameterSpec, UpdateStrategy};
pub use construction::{Construction, DecisionRule, ZERO_DISTANCE_HEURISTIC};
pub use runner::{Paco, PacoResult, PacoRunner, RunStats, MIN_NODES};
pub use types::{Ant, Population};
pub use update::{AgeUpdate, ElitistAgeUpdate, FifoUpdate, PopulationUpdate, QualityUpdate};
