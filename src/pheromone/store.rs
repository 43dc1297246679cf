//! The pheromone store interface and the engine-facing matrix.

use super::variants::{AsymmetricPheromones, SymmetricPheromones};

/// Maps an edge use count to a pheromone intensity.
///
/// `tau(count) = min(tau_max, tau_init + delta * count)` with
/// `tau_init = 1 / (n - 1)` and `delta = (tau_max - tau_init) / k`.
/// An edge shared by all `k` residents therefore carries exactly `tau_max`,
/// and an unused edge keeps a small positive intensity so that every
/// candidate stays selectable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PheromoneScale {
    tau_init: f64,
    delta: f64,
    tau_max: f64,
}

impl PheromoneScale {
    /// Scale for `n` nodes and a population of `k` members.
    ///
    /// # Panics
    /// Panics if `n < 2`, `k == 0`, or `tau_max` is below `tau_init`.
    pub fn new(n: usize, k: usize, tau_max: f64) -> Self {
        assert!(n >= 2, "a pheromone scale needs at least 2 nodes, got {n}");
        assert!(k > 0, "population size must be positive");
        let tau_init = 1.0 / (n - 1) as f64;
        assert!(
            tau_max >= tau_init,
            "tau_max ({tau_max}) must not be below the initial pheromone 1/(n-1) = {tau_init}"
        );
        Self {
            tau_init,
            delta: (tau_max - tau_init) / k as f64,
            tau_max,
        }
    }

    /// Intensity of an edge used by `count` residents.
    #[inline]
    pub fn intensity(&self, count: u32) -> f64 {
        (self.tau_init + self.delta * f64::from(count)).min(self.tau_max)
    }

    /// Intensity of an unused edge.
    pub fn tau_init(&self) -> f64 {
        self.tau_init
    }

    /// Intensity added per resident tour.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Upper bound of the intensity.
    pub fn tau_max(&self) -> f64 {
        self.tau_max
    }
}

/// Edge-use bookkeeping shared by the symmetric and asymmetric variants.
///
/// # Contract
///
/// For every edge, the number of `add` calls minus the number of `remove`
/// calls for tours containing it must equal the number of resident tours
/// containing it. Removing a tour that was never added panics.
pub trait PheromoneStore {
    /// Adds one unit to every edge of `tour`, including the closing edge.
    fn add(&mut self, tour: &[usize]);

    /// Removes the unit that [`add`](PheromoneStore::add) placed for `tour`.
    fn remove(&mut self, tour: &[usize]);

    /// Number of resident tours using the edge `u → v`.
    fn count(&self, u: usize, v: usize) -> u32;

    /// Pheromone intensity of the edge `u → v`, in `(0, tau_max]`.
    fn get(&self, u: usize, v: usize) -> f64;

    /// The scale converting counts to intensities.
    fn scale(&self) -> PheromoneScale;

    /// Number of tours currently added.
    fn residents(&self) -> usize;

    /// Removes all tours.
    fn clear(&mut self);
}

/// The pheromone store the engine owns for one run.
///
/// Chooses the symmetric variant for symmetric instances and the
/// asymmetric one otherwise, without dynamic dispatch on the hot path.
#[derive(Debug, Clone)]
pub enum PheromoneMatrix {
    /// `(u, v)` and `(v, u)` share one counter.
    Symmetric(SymmetricPheromones),
    /// Each direction has its own counter.
    Asymmetric(AsymmetricPheromones),
}

impl PheromoneMatrix {
    /// Allocates a store for `n` nodes, `k` residents and ceiling `tau_max`.
    pub fn new(n: usize, k: usize, tau_max: f64, symmetric: bool) -> Self {
        if symmetric {
            Self::Symmetric(SymmetricPheromones::new(n, k, tau_max))
        } else {
            Self::Asymmetric(AsymmetricPheromones::new(n, k, tau_max))
        }
    }

    /// Whether both directions of an edge share one counter.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Symmetric(_))
    }
}

impl PheromoneStore for PheromoneMatrix {
    fn add(&mut self, tour: &[usize]) {
        match self {
            Self::Symmetric(s) => s.add(tour),
            Self::Asymmetric(s) => s.add(tour),
        }
    }

    fn remove(&mut self, tour: &[usize]) {
        match self {
            Self::Symmetric(s) => s.remove(tour),
            Self::Asymmetric(s) => s.remove(tour),
        }
    }

    #[inline]
    fn count(&self, u: usize, v: usize) -> u32 {
        match self {
            Self::Symmetric(s) => s.count(u, v),
            Self::Asymmetric(s) => s.count(u, v),
        }
    }

    #[inline]
    fn get(&self, u: usize, v: usize) -> f64 {
        match self {
            Self::Symmetric(s) => s.get(u, v),
            Self::Asymmetric(s) => s.get(u, v),
        }
    }

    fn scale(&self) -> PheromoneScale {
        match self {
            Self::Symmetric(s) => s.scale(),
            Self::Asymmetric(s) => s.scale(),
        }
    }

    fn residents(&self) -> usize {
        match self {
            Self::Symmetric(s) => s.residents(),
            Self::Asymmetric(s) => s.residents(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Symmetric(s) => s.clear(),
            Self::Asymmetric(s) => s.clear(),
        }
    }
}
