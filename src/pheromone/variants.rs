//! Symmetric and asymmetric pheromone stores.

use super::counts::EdgeCounts;
use super::store::{PheromoneScale, PheromoneStore};

/// Visits every edge of a cyclic tour, including the closing one.
fn for_each_edge(tour: &[usize], mut visit: impl FnMut(usize, usize)) {
    if let (Some(&first), Some(&last)) = (tour.first(), tour.last()) {
        for w in tour.windows(2) {
            visit(w[0], w[1]);
        }
        visit(last, first);
    }
}

/// Pheromone store for asymmetric instances: `u → v` and `v → u` are
/// counted separately.
///
/// Each resident tour leaves every node through exactly one edge, so a row
/// needs at most `k` entries.
#[derive(Debug, Clone)]
pub struct AsymmetricPheromones {
    counts: EdgeCounts,
    scale: PheromoneScale,
    population_size: usize,
    residents: usize,
}

impl AsymmetricPheromones {
    /// Allocates a store for `n` nodes and `k` residents.
    pub fn new(n: usize, k: usize, tau_max: f64) -> Self {
        Self {
            counts: EdgeCounts::new(n, k),
            scale: PheromoneScale::new(n, k, tau_max),
            population_size: k,
            residents: 0,
        }
    }

    /// Every node has exactly one outgoing unit per resident.
    fn is_consistent(&self) -> bool {
        (0..self.counts.nodes()).all(|u| self.counts.row_total(u) == self.residents as u64)
    }
}

impl PheromoneStore for AsymmetricPheromones {
    fn add(&mut self, tour: &[usize]) {
        assert_eq!(tour.len(), self.counts.nodes(), "tour length must equal the node count");
        assert!(
            self.residents < self.population_size,
            "pheromone store already holds {} tours",
            self.population_size
        );
        for_each_edge(tour, |u, v| self.counts.increment(u, v));
        self.residents += 1;
        debug_assert!(self.is_consistent(), "pheromone counts out of balance after add");
    }

    fn remove(&mut self, tour: &[usize]) {
        assert_eq!(tour.len(), self.counts.nodes(), "tour length must equal the node count");
        assert!(self.residents > 0, "no tours to remove from the pheromone store");
        for_each_edge(tour, |u, v| self.counts.decrement(u, v));
        self.residents -= 1;
        debug_assert!(self.is_consistent(), "pheromone counts out of balance after remove");
    }

    #[inline]
    fn count(&self, u: usize, v: usize) -> u32 {
        self.counts.count(u, v)
    }

    #[inline]
    fn get(&self, u: usize, v: usize) -> f64 {
        self.scale.intensity(self.counts.count(u, v))
    }

    fn scale(&self) -> PheromoneScale {
        self.scale
    }

    fn residents(&self) -> usize {
        self.residents
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.residents = 0;
    }
}

/// Pheromone store for symmetric instances: `u → v` and `v → u` share one
/// counter.
///
/// An edge `{u, v}` is kept in the row of its smaller endpoint. Each
/// resident tour touches a node through two edges, so rows hold at most
/// `2k` entries.
#[derive(Debug, Clone)]
pub struct SymmetricPheromones {
    counts: EdgeCounts,
    scale: PheromoneScale,
    population_size: usize,
    residents: usize,
}

impl SymmetricPheromones {
    /// Allocates a store for `n` nodes and `k` residents.
    pub fn new(n: usize, k: usize, tau_max: f64) -> Self {
        Self {
            counts: EdgeCounts::new(n, 2 * k),
            scale: PheromoneScale::new(n, k, tau_max),
            population_size: k,
            residents: 0,
        }
    }

    #[inline]
    fn key(u: usize, v: usize) -> (usize, usize) {
        if u <= v {
            (u, v)
        } else {
            (v, u)
        }
    }

    /// Every node has exactly two incident units per resident.
    fn is_consistent(&self) -> bool {
        let n = self.counts.nodes();
        let mut incident = vec![0u64; n];
        for u in 0..n {
            for (v, c) in self.counts.entries(u) {
                incident[u] += u64::from(c);
                incident[v] += u64::from(c);
            }
        }
        incident.iter().all(|&total| total == 2 * self.residents as u64)
    }
}

impl PheromoneStore for SymmetricPheromones {
    fn add(&mut self, tour: &[usize]) {
        assert_eq!(tour.len(), self.counts.nodes(), "tour length must equal the node count");
        assert!(
            self.residents < self.population_size,
            "pheromone store already holds {} tours",
            self.population_size
        );
        for_each_edge(tour, |u, v| {
            let (a, b) = Self::key(u, v);
            self.counts.increment(a, b);
        });
        self.residents += 1;
        debug_assert!(self.is_consistent(), "pheromone counts out of balance after add");
    }

    fn remove(&mut self, tour: &[usize]) {
        assert_eq!(tour.len(), self.counts.nodes(), "tour length must equal the node count");
        assert!(self.residents > 0, "no tours to remove from the pheromone store");
        for_each_edge(tour, |u, v| {
            let (a, b) = Self::key(u, v);
            self.counts.decrement(a, b);
        });
        self.residents -= 1;
        debug_assert!(self.is_consistent(), "pheromone counts out of balance after remove");
    }

    #[inline]
    fn count(&self, u: usize, v: usize) -> u32 {
        let (a, b) = Self::key(u, v);
        self.counts.count(a, b)
    }

    #[inline]
    fn get(&self, u: usize, v: usize) -> f64 {
        self.scale.intensity(self.count(u, v))
    }

    fn scale(&self) -> PheromoneScale {
        self.scale
    }

    fn residents(&self) -> usize {
        self.residents
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.residents = 0;
    }
}
