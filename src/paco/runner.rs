//! PACO engine and run harness.
//!
//! [`Paco`] is the engine: it owns the population, the pheromone store and
//! the construction buffers for one run and talks to the outside world
//! only through an [`ObjectiveFunction`]. [`PacoRunner`] wraps it for the
//! common case of a [`DistanceMatrix`] with a [`Budget`].

use super::config::{InitialPopulation, PacoConfig};
use super::construction::{Construction, DecisionRule};
use super::types::{Ant, Population};
use super::update::PopulationUpdate;
use crate::error::PacoError;
use crate::local::{KOpt, LocalImprover};
use crate::objective::{Budget, DistanceMatrix, Improvement, ObjectiveFunction, TspObjective};
use crate::pheromone::{PheromoneMatrix, PheromoneStore};
use crate::tour::{nearest_neighbor_tour, tour_length};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};

/// Smallest instance the engine accepts.
pub const MIN_NODES: usize = 3;

/// Counters of one call to [`Paco::solve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Tours built by ants (seeded tours not included).
    pub constructions: u64,

    /// Completed rounds of `ants_per_iteration` ants.
    pub generations: u64,

    /// Population updates that admitted the round's best ant.
    pub admissions: u64,
}

/// Buffers owned by the engine between `begin_run` and `end_run`.
#[derive(Debug)]
struct RunState {
    n: usize,
    pheromones: PheromoneMatrix,
    population: Population,
    construction: Construction,
    round_best: Ant,
    has_round_best: bool,
}

/// The population-based ACO engine.
///
/// # Usage
///
/// ```
/// use u_paco::objective::{Budget, DistanceMatrix, TspObjective};
/// use u_paco::paco::{Paco, PacoConfig};
///
/// let m = DistanceMatrix::from_coordinates(&[
///     (0.0, 0.0), (3.0, 0.0), (6.0, 1.0), (6.0, 5.0), (2.0, 6.0), (0.0, 3.0),
/// ]).unwrap();
/// let mut f = TspObjective::new(&m, Budget::default().with_max_fes(500), 42);
///
/// let mut paco = Paco::new(PacoConfig::default()).unwrap();
/// paco.run(&mut f).unwrap();
/// assert!(f.best_length().is_some());
/// ```
pub struct Paco {
    config: PacoConfig,
    update: Box<dyn PopulationUpdate>,
    local_search: Option<Box<dyn LocalImprover>>,
    state: Option<RunState>,
}

impl std::fmt::Debug for Paco {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paco")
            .field("config", &self.config)
            .field("update", &self.update.name())
            .field("local_search", &self.local_search.as_ref().map(|ls| ls.name()))
            .field("running", &self.state.is_some())
            .finish()
    }
}

impl Paco {
    /// Creates an engine from a validated configuration.
    ///
    /// The update strategy and the optional k-opt are built from the
    /// configuration; both can be swapped with
    /// [`with_update_strategy`](Self::with_update_strategy) and
    /// [`with_local_search`](Self::with_local_search).
    ///
    /// # Errors
    /// Returns the first validation error of `config`.
    pub fn new(config: PacoConfig) -> Result<Self, PacoError> {
        config.validate()?;
        let update = config.update.build();
        let local_search = match &config.local_search {
            Some(ls) => Some(Box::new(KOpt::new(ls.clone())?) as Box<dyn LocalImprover>),
            None => None,
        };
        Ok(Self {
            config,
            update,
            local_search,
            state: None,
        })
    }

    /// Replaces the population update policy.
    pub fn with_update_strategy(mut self, update: Box<dyn PopulationUpdate>) -> Self {
        self.update = update;
        self
    }

    /// Replaces the local search applied to every constructed tour.
    pub fn with_local_search(mut self, local_search: Box<dyn LocalImprover>) -> Self {
        self.local_search = Some(local_search);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &PacoConfig {
        &self.config
    }

    /// Residents of the current run, if one is prepared.
    pub fn population(&self) -> Option<&Population> {
        self.state.as_ref().map(|s| &s.population)
    }

    /// Pheromone store of the current run, if one is prepared.
    pub fn pheromones(&self) -> Option<&PheromoneMatrix> {
        self.state.as_ref().map(|s| &s.pheromones)
    }

    /// Allocates all per-run storage for the instance behind `f`.
    ///
    /// # Errors
    /// Returns [`PacoError::InstanceTooSmall`] for fewer than 3 nodes.
    pub fn begin_run<F: ObjectiveFunction + ?Sized>(&mut self, f: &F) -> Result<(), PacoError> {
        let n = f.n();
        if n < MIN_NODES {
            return Err(PacoError::InstanceTooSmall { n, min: MIN_NODES });
        }
        let k = self.config.population_size;
        self.state = Some(RunState {
            n,
            pheromones: PheromoneMatrix::new(n, k, self.config.tau_max, f.is_symmetric()),
            population: Population::new(k),
            construction: Construction::new(n),
            round_best: Ant::new(Vec::with_capacity(n), 0, 0),
            has_round_best: false,
        });
        self.update.begin_run();
        if let Some(ls) = self.local_search.as_mut() {
            ls.begin_run(n);
        }
        debug!(
            n,
            symmetric = f.is_symmetric(),
            population_size = k,
            ants_per_iteration = self.config.ants_per_iteration,
            update = self.update.name(),
            "paco run prepared"
        );
        Ok(())
    }

    /// Runs ants until `f` asks to terminate.
    ///
    /// Every call starts from an empty population and an untouched
    /// pheromone store; only the buffers of the prepared run are reused.
    /// Termination is polled once before every new tour; a tour in
    /// progress is always completed. Every `ants_per_iteration` ants the
    /// shortest ant of the round is offered to the population.
    ///
    /// # Errors
    /// Returns [`PacoError::RunNotStarted`] without a preceding
    /// [`begin_run`](Self::begin_run), or
    /// [`PacoError::DimensionMismatch`] if `f` has a different size.
    pub fn solve<F: ObjectiveFunction>(&mut self, f: &mut F) -> Result<RunStats, PacoError> {
        let state = self.state.as_mut().ok_or(PacoError::RunNotStarted)?;
        if f.n() != state.n {
            return Err(PacoError::DimensionMismatch {
                expected: state.n,
                actual: f.n(),
            });
        }

        let rule = DecisionRule {
            alpha: self.config.alpha,
            beta: self.config.beta,
            q0: self.config.q0,
        };
        let m = self.config.ants_per_iteration;
        let mut stats = RunStats::default();
        let mut generation = 1u64;

        state.population.clear();
        state.pheromones.clear();
        state.has_round_best = false;

        if seed_population(self.config.initial_population, state, f, generation) > 0 {
            generation += 1;
        }

        let mut ants_in_round = 0usize;

        while !f.should_terminate() {
            let mut length = state.construction.build(f, &state.pheromones, &rule);
            if let Some(ls) = self.local_search.as_mut() {
                length = ls.improve(state.construction.tour_mut(), length, f);
            }
            stats.constructions += 1;

            if !state.has_round_best || length < state.round_best.length {
                let best = &mut state.round_best;
                best.tour.clear();
                best.tour.extend_from_slice(state.construction.tour());
                best.length = length;
                best.birthday = generation;
                state.has_round_best = true;
            }

            ants_in_round += 1;
            if ants_in_round == m {
                let admitted =
                    self.update
                        .update(&mut state.population, &state.round_best, &mut state.pheromones);
                if admitted {
                    stats.admissions += 1;
                }
                debug!(
                    generation,
                    round_best = state.round_best.length,
                    admitted,
                    residents = state.population.len(),
                    "population updated"
                );
                ants_in_round = 0;
                state.has_round_best = false;
                generation += 1;
                stats.generations += 1;
            }
        }

        debug!(
            constructions = stats.constructions,
            generations = stats.generations,
            "paco run stopped"
        );
        Ok(stats)
    }

    /// Releases the per-run storage.
    pub fn end_run(&mut self) {
        self.state = None;
        self.update.end_run();
        if let Some(ls) = self.local_search.as_mut() {
            ls.end_run();
        }
    }

    /// `begin_run`, `solve` and `end_run` in one call.
    pub fn run<F: ObjectiveFunction>(&mut self, f: &mut F) -> Result<RunStats, PacoError> {
        self.begin_run(&*f)?;
        let stats = self.solve(f);
        self.end_run();
        stats
    }
}

/// Seeds the population according to `init`; returns the number of tours
/// added.
fn seed_population<F: ObjectiveFunction>(
    init: InitialPopulation,
    state: &mut RunState,
    f: &mut F,
    generation: u64,
) -> usize {
    match init {
        InitialPopulation::Empty => 0,
        InitialPopulation::NearestNeighbor => {
            let n = state.n;
            let count = state.population.capacity().min(n);
            let mut starts: Vec<usize> = (0..n).collect();
            f.random().shuffle_all(&mut starts);

            let mut seeded = 0;
            for &start in &starts[..count] {
                if f.should_terminate() {
                    break;
                }
                let tour = nearest_neighbor_tour(n, start, |i, j| f.distance(i, j));
                let length = tour_length(&tour, |i, j| f.distance(i, j));
                f.register_fe(&tour, length);
                state
                    .population
                    .insert(&Ant::new(tour, length, generation), &mut state.pheromones);
                seeded += 1;
            }
            debug!(seeded, "population seeded with nearest-neighbor tours");
            seeded
        }
    }
}

/// Result of a [`PacoRunner`] run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacoResult {
    /// Seed of the run's random source.
    pub seed: i64,

    /// Shortest tour registered (empty if none was).
    pub best_tour: Vec<usize>,

    /// Its length.
    pub best_length: Option<u64>,

    /// FE counter value at which the best tour was registered.
    pub best_fe: u64,

    /// Complete tour evaluations.
    pub fes: u64,

    /// Delta evaluations by local search.
    pub des: u64,

    /// Engine counters.
    pub stats: RunStats,

    /// Every strict improvement of the best length.
    pub history: Vec<Improvement>,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

impl PacoResult {
    fn from_objective(seed: i64, f: &TspObjective<'_>, stats: RunStats) -> Self {
        Self {
            seed,
            best_tour: f.best_tour().to_vec(),
            best_length: f.best_length(),
            best_fe: f.best_fe(),
            fes: f.fes(),
            des: f.des(),
            stats,
            history: f.history().to_vec(),
            cancelled: f.is_cancelled(),
        }
    }
}

/// Runs the engine on an in-memory instance.
pub struct PacoRunner;

impl PacoRunner {
    /// Runs PACO on `matrix` until `budget` is exhausted.
    ///
    /// # Errors
    /// Returns a [`PacoError`] for invalid configurations, budgets or
    /// instances.
    pub fn run(
        matrix: &DistanceMatrix,
        config: &PacoConfig,
        budget: &Budget,
        seed: i64,
    ) -> Result<PacoResult, PacoError> {
        Self::run_with_cancel(matrix, config, budget, seed, None)
    }

    /// Runs PACO with an optional cancellation flag.
    pub fn run_with_cancel(
        matrix: &DistanceMatrix,
        config: &PacoConfig,
        budget: &Budget,
        seed: i64,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<PacoResult, PacoError> {
        budget.validate()?;
        let mut f = TspObjective::new(matrix, budget.clone(), seed);
        if let Some(flag) = cancel {
            f = f.with_cancel(flag);
        }
        let stats = Paco::new(config.clone())?.run(&mut f)?;
        let result = PacoResult::from_objective(seed, &f, stats);
        info!(
            seed,
            best_length = ?result.best_length,
            fes = result.fes,
            des = result.des,
            "paco replicate finished"
        );
        Ok(result)
    }

    /// Runs one independent replicate per seed, each with its own engine
    /// and random source. Results are in seed order.
    ///
    /// With the `parallel` feature the replicates run on the rayon pool.
    pub fn run_replicates(
        matrix: &DistanceMatrix,
        config: &PacoConfig,
        budget: &Budget,
        seeds: &[i64],
    ) -> Result<Vec<PacoResult>, PacoError> {
        config.validate()?;
        budget.validate()?;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            seeds
                .par_iter()
                .map(|&seed| Self::run(matrix, config, budget, seed))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            seeds
                .iter()
                .map(|&seed| Self::run(matrix, config, budget, seed))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::KOptConfig;
    use crate::paco::{InitialPopulation, UpdateStrategy};
    use crate::random::Randomizer;
    use crate::tour::is_valid_tour;
    use std::sync::atomic::Ordering;

    fn pentagon() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0, 3, 9, 9, 3],
            vec![3, 0, 3, 9, 9],
            vec![9, 3, 0, 3, 9],
            vec![9, 9, 3, 0, 3],
            vec![3, 9, 9, 3, 0],
        ])
        .unwrap()
    }

    fn random_points(n: usize, seed: i64) -> DistanceMatrix {
        let mut rng = Randomizer::new(seed);
        let points: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.next_double() * 1000.0, rng.next_double() * 1000.0))
            .collect();
        DistanceMatrix::from_coordinates(&points).unwrap()
    }

    /// Records every registered tour.
    struct Recorder<'a> {
        inner: TspObjective<'a>,
        tours: Vec<(Vec<usize>, u64)>,
    }

    impl ObjectiveFunction for Recorder<'_> {
        fn n(&self) -> usize {
            self.inner.n()
        }
        fn distance(&self, i: usize, j: usize) -> u64 {
            self.inner.distance(i, j)
        }
        fn is_symmetric(&self) -> bool {
            self.inner.is_symmetric()
        }
        fn register_fe(&mut self, tour: &[usize], length: u64) {
            self.tours.push((tour.to_vec(), length));
            self.inner.register_fe(tour, length);
        }
        fn register_de(&mut self, count: u64) {
            self.inner.register_de(count);
        }
        fn should_terminate(&self) -> bool {
            self.inner.should_terminate()
        }
        fn random(&mut self) -> &mut Randomizer {
            self.inner.random()
        }
    }

    #[test]
    fn test_convergence_on_pentagon() {
        let m = pentagon();
        let config = PacoConfig::default()
            .with_q0(0.0)
            .with_population_size(1)
            .with_ants_per_iteration(1);
        let result = PacoRunner::run(&m, &config, &Budget::default().with_max_fes(500), 3).unwrap();
        assert_eq!(result.best_length, Some(15));
        assert!(is_valid_tour(&result.best_tour, 5));
        assert!(result.best_fe <= 500);
    }

    #[test]
    fn test_every_registered_tour_is_valid() {
        let m = random_points(15, 8);
        let mut f = Recorder {
            inner: TspObjective::new(&m, Budget::default().with_max_fes(200), 4),
            tours: Vec::new(),
        };
        let stats = Paco::new(PacoConfig::default()).unwrap().run(&mut f).unwrap();
        assert_eq!(f.tours.len(), 200);
        assert_eq!(stats.constructions, 200);
        assert_eq!(stats.generations, 20);
        for (tour, length) in &f.tours {
            assert!(is_valid_tour(tour, 15));
            assert_eq!(*length, m.tour_length(tour));
        }
    }

    #[test]
    fn test_deterministic_exploitation() {
        let m = random_points(10, 21);
        let config = PacoConfig::default().with_q0(1.0);
        let budget = Budget::default().with_max_fes(50);
        let run = |seed| {
            let mut f = Recorder {
                inner: TspObjective::new(&m, budget.clone(), seed),
                tours: Vec::new(),
            };
            Paco::new(config.clone()).unwrap().run(&mut f).unwrap();
            f.tours
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_same_seed_same_result() {
        let m = random_points(20, 1);
        let config = PacoConfig::default().with_local_search(KOptConfig::new(2));
        let budget = Budget::default().with_max_fes(300);
        let a = PacoRunner::run(&m, &config, &budget, 5).unwrap();
        let b = PacoRunner::run(&m, &config, &budget, 5).unwrap();
        assert_eq!(a.best_tour, b.best_tour);
        assert_eq!(a.best_length, b.best_length);
        assert_eq!(a.des, b.des);
        assert!(a.des > 0);
    }

    #[test]
    fn test_population_tracks_pheromones() {
        let m = random_points(12, 2);
        let config = PacoConfig::default()
            .with_population_size(3)
            .with_ants_per_iteration(4)
            .with_update(UpdateStrategy::Quality);
        let mut f = TspObjective::new(&m, Budget::default().with_max_fes(80), 9);
        let mut paco = Paco::new(config).unwrap();
        paco.begin_run(&f).unwrap();
        let stats = paco.solve(&mut f).unwrap();
        assert_eq!(stats.generations, 20);

        let population = paco.population().unwrap();
        let pheromones = paco.pheromones().unwrap();
        assert_eq!(population.len(), 3);
        assert_eq!(pheromones.residents(), 3);
        for u in 0..12 {
            for v in 0..12 {
                if u == v {
                    continue;
                }
                let expected = population
                    .ants()
                    .iter()
                    .filter(|a| {
                        (0..12).any(|i| {
                            let (x, y) = (a.tour[i], a.tour[(i + 1) % 12]);
                            (x == u && y == v) || (x == v && y == u)
                        })
                    })
                    .count() as u32;
                assert_eq!(pheromones.count(u, v), expected);
                assert!(pheromones.get(u, v) <= 1.0);
            }
        }
        paco.end_run();
        assert!(paco.population().is_none());
    }

    #[test]
    fn test_nearest_neighbor_seeding() {
        let m = random_points(8, 3);
        let config = PacoConfig::default()
            .with_population_size(3)
            .with_initial_population(InitialPopulation::NearestNeighbor);
        let mut f = TspObjective::new(&m, Budget::default().with_max_fes(3), 1);
        let mut paco = Paco::new(config).unwrap();
        paco.begin_run(&f).unwrap();
        let stats = paco.solve(&mut f).unwrap();

        assert_eq!(stats.constructions, 0);
        let population = paco.population().unwrap();
        assert_eq!(population.len(), 3);
        for ant in population.ants() {
            assert_eq!(ant.birthday, 1);
            assert_eq!(ant.length, m.tour_length(&ant.tour));
        }
        let mut starts: Vec<usize> = population.ants().iter().map(|a| a.tour[0]).collect();
        starts.sort_unstable();
        starts.dedup();
        assert_eq!(starts.len(), 3);
    }

    #[test]
    fn test_second_solve_starts_fresh() {
        let m = random_points(8, 3);
        let config = PacoConfig::default()
            .with_population_size(3)
            .with_ants_per_iteration(2)
            .with_initial_population(InitialPopulation::NearestNeighbor);
        let mut paco = Paco::new(config).unwrap();
        let mut first = TspObjective::new(&m, Budget::default().with_max_fes(20), 1);
        paco.begin_run(&first).unwrap();
        let a = paco.solve(&mut first).unwrap();
        let residents: Vec<Ant> = paco.population().unwrap().ants().to_vec();

        let mut second = TspObjective::new(&m, Budget::default().with_max_fes(20), 1);
        let b = paco.solve(&mut second).unwrap();
        assert_eq!(a, b);
        assert_eq!(paco.population().unwrap().ants(), residents.as_slice());
        assert_eq!(paco.pheromones().unwrap().residents(), 3);
        assert_eq!(first.best_length(), second.best_length());
    }

    #[test]
    fn test_extreme_exponents_register_true_lengths() {
        let m = DistanceMatrix::from_fn(4, |i, j| 10 + (i + j) as u64);
        let config = PacoConfig::default()
            .with_alpha(1000.0)
            .with_beta(1000.0)
            .with_tau_max(1000.0)
            .with_q0(1.0)
            .with_population_size(1)
            .with_ants_per_iteration(1);
        let mut f = Recorder {
            inner: TspObjective::new(&m, Budget::default().with_max_fes(30), 2),
            tours: Vec::new(),
        };
        Paco::new(config).unwrap().run(&mut f).unwrap();
        assert_eq!(f.tours.len(), 30);
        for (tour, length) in &f.tours {
            assert!(is_valid_tour(tour, 4));
            assert_eq!(*length, m.tour_length(tour));
        }
    }

    #[test]
    fn test_solve_requires_begin_run() {
        let m = pentagon();
        let mut f = TspObjective::new(&m, Budget::default().with_max_fes(5), 1);
        let mut paco = Paco::new(PacoConfig::default()).unwrap();
        assert_eq!(paco.solve(&mut f), Err(PacoError::RunNotStarted));
    }

    #[test]
    fn test_dimension_mismatch() {
        let small = pentagon();
        let large = random_points(6, 1);
        let mut paco = Paco::new(PacoConfig::default()).unwrap();
        paco.begin_run(&TspObjective::new(&small, Budget::default(), 1))
            .unwrap();
        let mut f = TspObjective::new(&large, Budget::default().with_max_fes(5), 1);
        assert_eq!(
            paco.solve(&mut f),
            Err(PacoError::DimensionMismatch {
                expected: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_instance_too_small() {
        let m = DistanceMatrix::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
        let result = PacoRunner::run(&m, &PacoConfig::default(), &Budget::default().with_max_fes(5), 1);
        assert_eq!(result, Err(PacoError::InstanceTooSmall { n: 2, min: 3 }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PacoConfig::default().with_q0(2.0);
        assert!(matches!(
            Paco::new(config),
            Err(PacoError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let m = pentagon();
        let flag = Arc::new(AtomicBool::new(true));
        let result = PacoRunner::run_with_cancel(
            &m,
            &PacoConfig::default(),
            &Budget::default(),
            1,
            Some(flag.clone()),
        )
        .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.fes, 0);
        assert_eq!(result.best_length, None);
        flag.store(false, Ordering::Relaxed);
    }

    #[test]
    fn test_target_length_stops_early() {
        let m = pentagon();
        let budget = Budget::default().with_max_fes(10_000).with_target_length(15);
        let result = PacoRunner::run(&m, &PacoConfig::default(), &budget, 11).unwrap();
        assert_eq!(result.best_length, Some(15));
        assert!(result.fes < 10_000);
        assert_eq!(result.history.last().map(|h| h.length), Some(15));
    }

    #[test]
    fn test_custom_update_strategy() {
        struct Never;
        impl PopulationUpdate for Never {
            fn update(&mut self, _: &mut Population, _: &Ant, _: &mut dyn PheromoneStore) -> bool {
                false
            }
            fn name(&self) -> &str {
                "never"
            }
        }

        let m = random_points(9, 4);
        let mut f = TspObjective::new(&m, Budget::default().with_max_fes(40), 2);
        let mut paco = Paco::new(PacoConfig::default())
            .unwrap()
            .with_update_strategy(Box::new(Never));
        paco.begin_run(&f).unwrap();
        let stats = paco.solve(&mut f).unwrap();
        assert_eq!(stats.admissions, 0);
        assert!(paco.population().unwrap().is_empty());
    }

    #[test]
    fn test_run_replicates() {
        let m = random_points(10, 6);
        let budget = Budget::default().with_max_fes(100);
        let seeds = [1, 2, 3];
        let results = PacoRunner::run_replicates(&m, &PacoConfig::default(), &budget, &seeds).unwrap();
        assert_eq!(results.len(), 3);
        for (result, &seed) in results.iter().zip(&seeds) {
            assert_eq!(result.seed, seed);
            assert_eq!(result.fes, 100);
            let single = PacoRunner::run(&m, &PacoConfig::default(), &budget, seed).unwrap();
            assert_eq!(result.best_length, single.best_length);
        }
    }
}
