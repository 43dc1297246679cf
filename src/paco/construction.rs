//! Tour construction by a single ant.

use crate::node_pool::NodePool;
use crate::objective::ObjectiveFunction;
use crate::pheromone::PheromoneStore;

/// Heuristic value used for an edge of length zero instead of `1/0`.
pub const ZERO_DISTANCE_HEURISTIC: f64 = 2.0;

/// The pseudo-random proportional rule of an ant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionRule {
    /// Pheromone exponent.
    pub alpha: f64,
    /// Heuristic exponent.
    pub beta: f64,
    /// Probability of picking the best-scored candidate outright.
    pub q0: f64,
}

impl DecisionRule {
    /// `tau^alpha * eta^beta` with `eta = 1 / distance`.
    #[inline]
    pub fn score(&self, tau: f64, distance: u64) -> f64 {
        let eta = if distance == 0 {
            ZERO_DISTANCE_HEURISTIC
        } else {
            1.0 / distance as f64
        };
        tau.powf(self.alpha) * eta.powf(self.beta)
    }
}

/// Builds tours one ant at a time, reusing its buffers.
///
/// Starting at a random node, each step either takes the best-scored
/// unvisited node (with probability `q0`) or samples one in proportion to
/// its score. The last node needs no decision.
#[derive(Debug, Clone)]
pub struct Construction {
    pool: NodePool,
    tour: Vec<usize>,
    distances: Vec<u64>,
    table: Vec<f64>,
}

impl Construction {
    /// Allocates buffers for instances with `n` nodes.
    pub fn new(n: usize) -> Self {
        Self {
            pool: NodePool::new(n),
            tour: Vec::with_capacity(n),
            distances: vec![0; n],
            table: vec![0.0; n],
        }
    }

    /// The tour built by the last call to [`build`](Self::build).
    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    /// Mutable access for local search.
    pub fn tour_mut(&mut self) -> &mut [usize] {
        &mut self.tour
    }

    /// Builds one tour, registers it as an FE and returns its length.
    ///
    /// # Panics
    /// Panics if `f.n()` differs from the size given to
    /// [`new`](Self::new) or is below 2.
    pub fn build<F, P>(&mut self, f: &mut F, pheromones: &P, rule: &DecisionRule) -> u64
    where
        F: ObjectiveFunction + ?Sized,
        P: PheromoneStore + ?Sized,
    {
        let n = f.n();
        assert_eq!(
            n,
            self.distances.len(),
            "construction prepared for {} nodes",
            self.distances.len()
        );
        assert!(n >= 2, "cannot build a tour over {n} nodes");

        self.pool.init(n);
        self.tour.clear();
        let start = self.pool.delete_random(f.random());
        self.tour.push(start);
        let mut last = start;
        let mut length = 0u64;

        while self.pool.remaining() > 1 {
            let remaining = self.pool.remaining();
            let explore = f.random().next_double() >= rule.q0;

            let (slot, distance) = if explore {
                let mut sum = 0.0;
                for slot in 0..remaining {
                    let candidate = self.pool.get_by_index(slot);
                    let d = f.distance(last, candidate);
                    sum += rule.score(pheromones.get(last, candidate), d);
                    self.table[slot] = sum;
                    self.distances[slot] = d;
                }
                let x = f.random().next_double() * sum;
                let slot = select_slot(&self.table[..remaining], x);
                (slot, self.distances[slot])
            } else {
                let head = self.pool.get_by_index(0);
                let d = f.distance(last, head);
                let mut best = (0, d);
                let mut best_score = rule.score(pheromones.get(last, head), d);
                for slot in 1..remaining {
                    let candidate = self.pool.get_by_index(slot);
                    let d = f.distance(last, candidate);
                    let score = rule.score(pheromones.get(last, candidate), d);
                    // A NaN score (inf * 0 under extreme exponents) never wins.
                    if score > best_score || (best_score.is_nan() && !score.is_nan()) {
                        best_score = score;
                        best = (slot, d);
                    }
                }
                best
            };

            let next = self.pool.get_by_index(slot);
            self.pool.delete_by_id(next);
            self.tour.push(next);
            length += distance;
            last = next;
        }

        let final_node = self.pool.delete_last();
        self.tour.push(final_node);
        length += f.distance(last, final_node) + f.distance(final_node, start);

        f.register_fe(&self.tour, length);
        length
    }
}

/// Roulette-wheel pick: the first slot whose running sum reaches `x`.
/// When rounding lets `x` overrun the last sum, or the sums are not finite,
/// the result is clamped to the last slot.
fn select_slot(cumulative: &[f64], x: f64) -> usize {
    cumulative.partition_point(|&c| c < x).min(cumulative.len() - 1)
}
