//! Deterministic random source.
//!
//! Benchmark runs must be repeatable bit for bit, so the engine does not
//! rely on a general-purpose generator whose algorithm may change between
//! library versions. [`Randomizer`] fixes a 48-bit linear congruential
//! recurrence together with the derived integer, floating-point, Gaussian
//! and shuffle operations.
//!
//! # References
//!
//! - Knuth (1969), *The Art of Computer Programming*, Vol. 2, Section 3.2.1
//! - Box & Muller (1958), "A Note on the Generation of Random Normal Deviates"

mod randomizer;

pub use randomizer::Randomizer;
