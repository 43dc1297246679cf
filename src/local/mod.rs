//! Local neighborhood improvement of complete tours.
//!
//! After an ant has built a tour the engine may hand it to a
//! [`LocalImprover`]. The provided implementation is [`KOpt`], an
//! exhaustive k-opt neighborhood for `2 <= k <= 7` that applies the best
//! strictly improving move of a pass.
//!
//! # References
//!
//! - Lin (1965), "Computer Solutions of the Traveling Salesman Problem"
//! - Helsgaun (2009), "General k-opt submoves for the Lin–Kernighan TSP
//!   heuristic"

mod config;
mod kopt;
mod patterns;
mod types;

pub use config::KOptConfig;
pub use kopt::KOpt;
pub use types::LocalImprover;
