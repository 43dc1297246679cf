//! Reference objective function with budget and best-so-far bookkeeping.

use super::matrix::DistanceMatrix;
use super::types::ObjectiveFunction;
use crate::error::PacoError;
use crate::random::Randomizer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Termination budget of a run.
///
/// A run stops as soon as any configured limit is reached. With no limit
/// configured the run only stops on cancellation, so harnesses should set
/// at least one.
///
/// # Examples
///
/// ```
/// use u_paco::objective::Budget;
///
/// let budget = Budget::default()
///     .with_max_fes(10_000)
///     .with_time_limit_ms(2_000);
/// assert!(budget.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Budget {
    /// Maximum number of complete tour evaluations.
    pub max_fes: Option<u64>,

    /// Maximum number of delta evaluations performed by local search.
    pub max_des: Option<u64>,

    /// Wall-clock limit in milliseconds, checked before each new tour.
    pub time_limit_ms: Option<u64>,

    /// Known optimal (or target) tour length; reaching it stops the run.
    pub target_length: Option<u64>,
}

impl Budget {
    /// Sets the maximum number of complete tour evaluations.
    pub fn with_max_fes(mut self, n: u64) -> Self {
        self.max_fes = Some(n);
        self
    }

    /// Sets the maximum number of delta evaluations.
    pub fn with_max_des(mut self, n: u64) -> Self {
        self.max_des = Some(n);
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the target tour length.
    pub fn with_target_length(mut self, length: u64) -> Self {
        self.target_length = Some(length);
        self
    }

    /// Validates the budget.
    pub fn validate(&self) -> Result<(), PacoError> {
        if self.max_fes == Some(0) {
            return Err(PacoError::InvalidBudget("max_fes must be positive or None".into()));
        }
        if self.max_des == Some(0) {
            return Err(PacoError::InvalidBudget("max_des must be positive or None".into()));
        }
        if self.time_limit_ms == Some(0) {
            return Err(PacoError::InvalidBudget(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        Ok(())
    }
}

/// One point of the convergence history: a strictly better tour was
/// registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Improvement {
    /// FE counter value at which the tour was registered (1-based).
    pub fe: u64,

    /// DE counter value at that moment.
    pub de: u64,

    /// Milliseconds since the objective was created.
    pub elapsed_ms: u64,

    /// Length of the new best tour.
    pub length: u64,
}

/// [`ObjectiveFunction`] over a [`DistanceMatrix`].
///
/// Counts evaluations, enforces a [`Budget`], honours an optional shared
/// cancellation flag, and keeps the best registered tour with its history.
#[derive(Debug)]
pub struct TspObjective<'a> {
    matrix: &'a DistanceMatrix,
    budget: Budget,
    random: Randomizer,
    cancel: Option<Arc<AtomicBool>>,
    started: Instant,
    fes: u64,
    des: u64,
    best_tour: Vec<usize>,
    best_length: Option<u64>,
    best_fe: u64,
    history: Vec<Improvement>,
}

impl<'a> TspObjective<'a> {
    /// Creates an objective with an explicitly seeded random source.
    pub fn new(matrix: &'a DistanceMatrix, budget: Budget, seed: i64) -> Self {
        Self::with_randomizer(matrix, budget, Randomizer::new(seed))
    }

    /// Creates an objective around an existing random source.
    pub fn with_randomizer(matrix: &'a DistanceMatrix, budget: Budget, random: Randomizer) -> Self {
        Self {
            matrix,
            budget,
            random,
            cancel: None,
            started: Instant::now(),
            fes: 0,
            des: 0,
            best_tour: Vec::new(),
            best_length: None,
            best_fe: 0,
            history: Vec::new(),
        }
    }

    /// Attaches a cancellation flag that stops the run once set.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The instance.
    pub fn matrix(&self) -> &DistanceMatrix {
        self.matrix
    }

    /// The budget.
    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Number of complete tour evaluations so far.
    pub fn fes(&self) -> u64 {
        self.fes
    }

    /// Number of delta evaluations so far.
    pub fn des(&self) -> u64 {
        self.des
    }

    /// Best tour registered so far (empty before the first FE).
    pub fn best_tour(&self) -> &[usize] {
        &self.best_tour
    }

    /// Length of the best tour, if any was registered.
    pub fn best_length(&self) -> Option<u64> {
        self.best_length
    }

    /// FE counter value at which the best tour was registered.
    pub fn best_fe(&self) -> u64 {
        self.best_fe
    }

    /// Every strict improvement of the best length, in order.
    pub fn history(&self) -> &[Improvement] {
        &self.history
    }

    /// Whether the cancellation flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl ObjectiveFunction for TspObjective<'_> {
    fn n(&self) -> usize {
        self.matrix.n()
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> u64 {
        self.matrix.distance(i, j)
    }

    fn is_symmetric(&self) -> bool {
        self.matrix.is_symmetric()
    }

    fn register_fe(&mut self, tour: &[usize], length: u64) {
        debug_assert!(
            crate::tour::is_valid_tour(tour, self.matrix.n()),
            "registered tour is not a permutation"
        );
        debug_assert_eq!(
            self.matrix.tour_length(tour),
            length,
            "registered length does not match the tour"
        );

        self.fes += 1;
        if self.best_length.is_none_or(|best| length < best) {
            self.best_length = Some(length);
            self.best_tour.clear();
            self.best_tour.extend_from_slice(tour);
            self.best_fe = self.fes;
            self.history.push(Improvement {
                fe: self.fes,
                de: self.des,
                elapsed_ms: self.elapsed_ms(),
                length,
            });
        }
    }

    fn register_de(&mut self, count: u64) {
        self.des = self.des.saturating_add(count);
    }

    fn should_terminate(&self) -> bool {
        if self.is_cancelled() {
            return true;
        }
        if self.budget.max_fes.is_some_and(|max| self.fes >= max) {
            return true;
        }
        if self.budget.max_des.is_some_and(|max| self.des >= max) {
            return true;
        }
        if let (Some(target), Some(best)) = (self.budget.target_length, self.best_length) {
            if best <= target {
                return true;
            }
        }
        self.budget
            .time_limit_ms
            .is_some_and(|limit| self.elapsed_ms() >= limit)
    }

    fn random(&mut self) -> &mut Randomizer {
        &mut self.random
    }
}
