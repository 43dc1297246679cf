//! Core trait for the objective-function boundary.

use crate::random::Randomizer;

/// What the solving engine needs from the outside world.
///
/// The engine polls [`should_terminate`](ObjectiveFunction::should_terminate)
/// once before starting each new tour, reports every complete tour through
/// [`register_fe`](ObjectiveFunction::register_fe), and reports partial
/// (delta) evaluations done by local search through
/// [`register_de`](ObjectiveFunction::register_de).
///
/// # Examples
///
/// ```ignore
/// struct Fixed { d: Vec<Vec<u64>>, rng: Randomizer, fes: u64 }
///
/// impl ObjectiveFunction for Fixed {
///     fn n(&self) -> usize { self.d.len() }
///     fn distance(&self, i: usize, j: usize) -> u64 { self.d[i][j] }
///     fn is_symmetric(&self) -> bool { true }
///     fn register_fe(&mut self, _tour: &[usize], _length: u64) { self.fes += 1; }
///     fn should_terminate(&self) -> bool { self.fes >= 1000 }
///     fn random(&mut self) -> &mut Randomizer { &mut self.rng }
/// }
/// ```
pub trait ObjectiveFunction {
    /// Number of nodes of the instance.
    fn n(&self) -> usize;

    /// Non-negative integer distance from node `i` to node `j`.
    fn distance(&self, i: usize, j: usize) -> u64;

    /// Whether `distance(i, j) == distance(j, i)` for all pairs.
    ///
    /// Symmetric instances let the engine share pheromone between both
    /// directions of an edge and skip orientation costs in local search.
    fn is_symmetric(&self) -> bool;

    /// Records one complete tour evaluation.
    fn register_fe(&mut self, tour: &[usize], length: u64);

    /// Records `count` partial evaluations (move deltas).
    ///
    /// The default implementation ignores them.
    fn register_de(&mut self, _count: u64) {}

    /// Whether the run should stop before the next tour is started.
    fn should_terminate(&self) -> bool;

    /// The random source of the current run.
    fn random(&mut self) -> &mut Randomizer;
}
