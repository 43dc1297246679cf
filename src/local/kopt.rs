//! Exhaustive k-opt local search.

use super::config::{KOptConfig, MAX_K};
use super::patterns::{reconnections, Reconnection};
use super::types::LocalImprover;
use crate::error::PacoError;
use crate::objective::ObjectiveFunction;
use tracing::trace;

/// The best move found by a pass.
#[derive(Debug, Clone, Copy)]
struct Move {
    cuts: [usize; MAX_K],
    order: usize,
    pattern: Reconnection,
    gain: u64,
}

/// Exhaustive k-opt neighborhood.
///
/// A pass scores every pure j-opt move for `j = 2..=k`: every set of `j`
/// removed edges and every reconnection of the segments in between. The
/// segment containing the wrap-around stays in front. It stays forward on
/// symmetric instances and takes both orientations on asymmetric ones, so
/// each tour is reached once. Reconnections that restore a removed edge are
/// not scored (they are lower-order moves scored on their own), and neither
/// are relabelled orientations of single-node segments.
///
/// On asymmetric instances reversing a segment changes its internal cost;
/// prefix sums over the closed tour in both directions make that an O(1)
/// lookup, including for the wrap-around segment, so every move is scored
/// in O(k).
///
/// # Examples
///
/// ```
/// use u_paco::local::{KOpt, KOptConfig, LocalImprover};
/// use u_paco::objective::{Budget, DistanceMatrix, TspObjective};
///
/// let m = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
///     .unwrap();
/// let mut f = TspObjective::new(&m, Budget::default(), 1);
/// let mut tour = vec![0, 2, 1, 3];
/// let length = m.tour_length(&tour);
///
/// let mut two_opt = KOpt::new(KOptConfig::new(2)).unwrap();
/// let improved = two_opt.improve(&mut tour, length, &mut f);
/// assert_eq!(improved, 40);
/// ```
#[derive(Debug, Clone)]
pub struct KOpt {
    config: KOptConfig,
    /// Index `j - 2` holds the j-opt reconnections.
    symmetric_patterns: Vec<Vec<Reconnection>>,
    directed_patterns: Vec<Vec<Reconnection>>,
    forward: Vec<u64>,
    backward: Vec<u64>,
    buffer: Vec<usize>,
}

impl KOpt {
    /// Creates the neighborhood and precomputes its reconnection tables.
    ///
    /// # Errors
    /// Returns [`PacoError::InvalidLocalSearch`] if the configuration is
    /// invalid.
    pub fn new(config: KOptConfig) -> Result<Self, PacoError> {
        config.validate()?;
        let symmetric_patterns = (2..=config.k).map(|j| reconnections(j, true)).collect();
        let directed_patterns = (2..=config.k).map(|j| reconnections(j, false)).collect();
        Ok(Self {
            config,
            symmetric_patterns,
            directed_patterns,
            forward: Vec::new(),
            backward: Vec::new(),
            buffer: Vec::new(),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &KOptConfig {
        &self.config
    }

    /// Scores one pass and returns the best strictly improving move
    /// together with the number of scored reconnections.
    fn best_move(
        &mut self,
        tour: &[usize],
        f: &dyn ObjectiveFunction,
        symmetric: bool,
    ) -> (Option<Move>, u64) {
        let n = tour.len();
        if !symmetric {
            fill_prefix_sums(tour, f, &mut self.forward, &mut self.backward);
        }

        let cap = self.config.max_evaluations_per_pass.unwrap_or(u64::MAX);
        let patterns = if symmetric {
            &self.symmetric_patterns
        } else {
            &self.directed_patterns
        };
        let mut scored = 0u64;
        let mut best: Option<Move> = None;

        'search: for (index, moves) in patterns.iter().enumerate() {
            let j = index + 2;
            if j > n {
                break;
            }
            let mut cuts = [0usize; MAX_K];
            for (i, c) in cuts[..j].iter_mut().enumerate() {
                *c = i;
            }

            loop {
                let cut = &cuts[..j];
                let mut first = [0usize; MAX_K];
                let mut last = [0usize; MAX_K];
                let mut inner_forward = [0u64; MAX_K];
                let mut inner_backward = [0u64; MAX_K];
                let mut singletons = 0u8;

                let removed: u64 = cut.iter().map(|&c| f.distance(tour[c], tour[(c + 1) % n])).sum();
                let (head_start, head_end) = (cut[j - 1] + 1, cut[0]);
                first[0] = tour[head_start % n];
                last[0] = tour[head_end];
                let single_head = head_start == n && head_end == 0;
                if !symmetric {
                    let (fw, bw) = (&self.forward, &self.backward);
                    inner_forward[0] = fw[n] - fw[head_start] + fw[head_end];
                    inner_backward[0] = bw[n] - bw[head_start] + bw[head_end];
                }
                for s in 1..j {
                    let (a, b) = (cut[s - 1] + 1, cut[s]);
                    first[s] = tour[a];
                    last[s] = tour[b];
                    if !symmetric {
                        inner_forward[s] = self.forward[b] - self.forward[a];
                        inner_backward[s] = self.backward[b] - self.backward[a];
                    }
                    if a == b {
                        singletons |= 1 << s;
                    }
                }

                for pattern in moves {
                    let mask = pattern.reversed_mask();
                    let redundant = if pattern.is_reversed(0) {
                        single_head || !mask & singletons != 0
                    } else {
                        mask & singletons != 0
                            || (single_head && !symmetric && !pattern.is_mirror_pure(singletons))
                    };
                    if redundant {
                        continue;
                    }
                    if scored >= cap {
                        break 'search;
                    }
                    scored += 1;

                    let mut added = 0u64;
                    let mut dropped = removed;
                    let (head_entry, mut exit) = if pattern.is_reversed(0) {
                        added += inner_backward[0];
                        dropped += inner_forward[0];
                        (last[0], first[0])
                    } else {
                        (first[0], last[0])
                    };
                    for &segment in pattern.order() {
                        let s = usize::from(segment);
                        let reversed = pattern.is_reversed(segment);
                        let (entry, next_exit) = if reversed {
                            (last[s], first[s])
                        } else {
                            (first[s], last[s])
                        };
                        added += f.distance(exit, entry);
                        if reversed && !symmetric {
                            added += inner_backward[s];
                            dropped += inner_forward[s];
                        }
                        exit = next_exit;
                    }
                    added += f.distance(exit, head_entry);

                    if added < dropped {
                        let gain = dropped - added;
                        if best.is_none_or(|m| gain > m.gain) {
                            best = Some(Move {
                                cuts,
                                order: j,
                                pattern: *pattern,
                                gain,
                            });
                        }
                    }
                }

                if !next_combination(&mut cuts[..j], n) {
                    break;
                }
            }
        }

        (best, scored)
    }

    /// Rebuilds `tour` according to `mv`.
    fn apply(&mut self, tour: &mut [usize], mv: &Move) {
        let cut = &mv.cuts[..mv.order];
        let j = mv.order;
        self.buffer.clear();
        self.buffer.extend_from_slice(&tour[cut[j - 1] + 1..]);
        self.buffer.extend_from_slice(&tour[..=cut[0]]);
        if mv.pattern.is_reversed(0) {
            self.buffer.reverse();
        }
        for &segment in mv.pattern.order() {
            let s = usize::from(segment);
            let nodes = &tour[cut[s - 1] + 1..=cut[s]];
            if mv.pattern.is_reversed(segment) {
                self.buffer.extend(nodes.iter().rev());
            } else {
                self.buffer.extend_from_slice(nodes);
            }
        }
        tour.copy_from_slice(&self.buffer);
    }
}

impl LocalImprover for KOpt {
    fn begin_run(&mut self, n: usize) {
        self.forward.reserve(n + 1);
        self.backward.reserve(n + 1);
        self.buffer.reserve(n);
    }

    /// Applies the best improving move of a pass, or repeats passes until
    /// none is left when `until_local_optimum` is set. Repetition also
    /// stops once the objective asks to terminate.
    fn improve(&mut self, tour: &mut [usize], length: u64, f: &mut dyn ObjectiveFunction) -> u64 {
        if tour.len() < 3 {
            return length;
        }
        let symmetric = f.is_symmetric();
        let mut current = length;

        loop {
            let (best, scored) = self.best_move(tour, &*f, symmetric);
            f.register_de(scored);
            let Some(mv) = best else {
                break;
            };
            self.apply(tour, &mv);
            current -= mv.gain;
            f.register_fe(tour, current);
            trace!(order = mv.order, gain = mv.gain, length = current, "k-opt move applied");

            if !self.config.until_local_optimum || f.should_terminate() {
                break;
            }
        }
        current
    }

    fn end_run(&mut self) {
        self.forward = Vec::new();
        self.backward = Vec::new();
        self.buffer = Vec::new();
    }

    fn name(&self) -> String {
        format!("{}-opt", self.config.k)
    }
}

/// `forward[p]` is the cost of the path `tour[0] → .. → tour[p]`,
/// `backward[p]` the cost of walking it in the opposite direction. Entry `n`
/// closes the cycle back to `tour[0]`.
fn fill_prefix_sums(
    tour: &[usize],
    f: &dyn ObjectiveFunction,
    forward: &mut Vec<u64>,
    backward: &mut Vec<u64>,
) {
    forward.clear();
    backward.clear();
    forward.push(0);
    backward.push(0);
    for w in tour.windows(2) {
        let (fw, bw) = (forward[forward.len() - 1], backward[backward.len() - 1]);
        forward.push(fw + f.distance(w[0], w[1]));
        backward.push(bw + f.distance(w[1], w[0]));
    }
    if let (Some(&head), Some(&tail)) = (tour.first(), tour.last()) {
        let (fw, bw) = (forward[forward.len() - 1], backward[backward.len() - 1]);
        forward.push(fw + f.distance(tail, head));
        backward.push(bw + f.distance(head, tail));
    }
}

/// Advances `cuts` to the next increasing combination of positions in
/// `0..n`; `false` after the last one.
fn next_combination(cuts: &mut [usize], n: usize) -> bool {
    let j = cuts.len();
    let mut i = j;
    while i > 0 {
        i -= 1;
        if cuts[i] < n - j + i {
            cuts[i] += 1;
            for t in i + 1..j {
                cuts[t] = cuts[t - 1] + 1;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::patterns::next_permutation;
    use crate::objective::{Budget, DistanceMatrix, TspObjective};
    use crate::random::Randomizer;
    use crate::tour::{is_valid_tour, random_tour};
    use proptest::prelude::*;

    fn random_matrix(n: usize, symmetric: bool, seed: i64) -> DistanceMatrix {
        let mut rng = Randomizer::new(seed);
        let mut d = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    d[i][j] = 1 + rng.next_int(99) as u64;
                }
            }
        }
        if symmetric {
            for i in 0..n {
                for j in 0..i {
                    d[i][j] = d[j][i];
                }
            }
        }
        DistanceMatrix::from_rows(d).unwrap()
    }

    fn brute_force_optimum(m: &DistanceMatrix) -> u64 {
        fn extend(m: &DistanceMatrix, tour: &mut Vec<usize>, used: &mut [bool], best: &mut u64) {
            if tour.len() == used.len() {
                *best = (*best).min(m.tour_length(tour));
                return;
            }
            for v in 1..used.len() {
                if !used[v] {
                    used[v] = true;
                    tour.push(v);
                    extend(m, tour, used, best);
                    tour.pop();
                    used[v] = false;
                }
            }
        }
        let mut used = vec![false; m.n()];
        used[0] = true;
        let mut best = u64::MAX;
        extend(m, &mut vec![0], &mut used, &mut best);
        best
    }

    fn canonical(tour: &[usize]) -> Vec<usize> {
        let start = tour.iter().position(|&v| v == 0).unwrap();
        [&tour[start..], &tour[..start]].concat()
    }

    /// Shortest tour reachable by cutting `2..=k` edges and reassembling the
    /// segments in any order and orientation. The starting cycle and its
    /// reversal are not moves; without an improving move the current length
    /// is returned.
    fn best_reconnection(m: &DistanceMatrix, tour: &[usize], k: usize) -> u64 {
        let n = tour.len();
        let reversed: Vec<usize> = tour.iter().rev().copied().collect();
        let excluded = [canonical(tour), canonical(&reversed)];
        let mut best = m.tour_length(tour);

        for j in 2..=k.min(n) {
            let mut cuts: Vec<usize> = (0..j).collect();
            loop {
                let mut segments = vec![[&tour[cuts[j - 1] + 1..], &tour[..=cuts[0]]].concat()];
                for s in 1..j {
                    segments.push(tour[cuts[s - 1] + 1..=cuts[s]].to_vec());
                }
                let mut order: Vec<u8> = (1..j as u8).collect();
                loop {
                    for mask in 0u32..(1 << j) {
                        let mut candidate = Vec::with_capacity(n);
                        let visit = std::iter::once(0).chain(order.iter().map(|&s| usize::from(s)));
                        for s in visit {
                            if (mask >> s) & 1 == 1 {
                                candidate.extend(segments[s].iter().rev());
                            } else {
                                candidate.extend_from_slice(&segments[s]);
                            }
                        }
                        if !excluded.contains(&canonical(&candidate)) {
                            best = best.min(m.tour_length(&candidate));
                        }
                    }
                    if !next_permutation(&mut order) {
                        break;
                    }
                }
                if !next_combination(&mut cuts, n) {
                    break;
                }
            }
        }
        best
    }

    #[test]
    fn test_next_combination_enumerates_all() {
        let mut cuts = [0, 1, 2];
        let mut count = 1;
        while next_combination(&mut cuts, 6) {
            assert!(cuts[0] < cuts[1] && cuts[1] < cuts[2] && cuts[2] < 6);
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn test_two_opt_uncrosses_square() {
        let m = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
            .unwrap();
        let mut f = TspObjective::new(&m, Budget::default(), 1);
        let mut tour = vec![0, 2, 1, 3];
        let length = m.tour_length(&tour);
        let mut kopt = KOpt::new(KOptConfig::new(2)).unwrap();

        let improved = kopt.improve(&mut tour, length, &mut f);
        assert_eq!(improved, 40);
        assert_eq!(m.tour_length(&tour), 40);
        assert_eq!(f.fes(), 1);
    }

    #[test]
    fn test_two_opt_counts_delta_evaluations() {
        // C(5, 2) = 10 cut pairs, 4 of which leave a single-node segment.
        let m = random_matrix(5, true, 3);
        let mut f = TspObjective::new(&m, Budget::default(), 1);
        let mut tour = vec![0, 1, 2, 3, 4];
        let length = m.tour_length(&tour);
        KOpt::new(KOptConfig::new(2))
            .unwrap()
            .improve(&mut tour, length, &mut f);
        assert_eq!(f.des(), 6);
    }

    #[test]
    fn test_evaluation_cap() {
        let m = random_matrix(9, false, 5);
        let mut f = TspObjective::new(&m, Budget::default(), 1);
        let mut tour: Vec<usize> = (0..9).collect();
        let length = m.tour_length(&tour);
        let mut kopt = KOpt::new(KOptConfig::new(3).with_max_evaluations_per_pass(7)).unwrap();
        let improved = kopt.improve(&mut tour, length, &mut f);
        assert_eq!(f.des(), 7);
        assert!(improved <= length);
        assert_eq!(m.tour_length(&tour), improved);
    }

    #[test]
    fn test_seven_opt_reaches_optimum() {
        for (seed, symmetric) in [(1, true), (2, false), (3, true), (4, false)] {
            let m = random_matrix(7, symmetric, seed);
            let optimum = brute_force_optimum(&m);
            let mut rng = Randomizer::new(seed + 100);
            let mut tour = random_tour(7, &mut rng);
            let length = m.tour_length(&tour);
            let mut f = TspObjective::new(&m, Budget::default(), seed);

            let improved = KOpt::new(KOptConfig::new(7))
                .unwrap()
                .improve(&mut tour, length, &mut f);
            assert_eq!(improved, optimum, "seed {seed}, symmetric {symmetric}");
        }
    }

    #[test]
    fn test_single_pass_matches_exhaustive_reconnection() {
        for symmetric in [false, true] {
            for n in 5..=8 {
                for k in 2..n.min(5) {
                    for seed in 0..3 {
                        let m = random_matrix(n, symmetric, seed * 31 + n as i64);
                        let mut rng = Randomizer::new(seed + 7);
                        let mut tour = random_tour(n, &mut rng);
                        let length = m.tour_length(&tour);
                        let expected = best_reconnection(&m, &tour, k);
                        let mut f = TspObjective::new(&m, Budget::default(), 1);

                        let improved = KOpt::new(KOptConfig::new(k))
                            .unwrap()
                            .improve(&mut tour, length, &mut f);
                        assert_eq!(
                            improved, expected,
                            "n {n}, k {k}, seed {seed}, symmetric {symmetric}"
                        );
                        assert_eq!(m.tour_length(&tour), improved);
                    }
                }
            }
        }
    }

    #[test]
    fn test_asymmetric_two_opt_reverses_wrap_segment() {
        // Directed ring 0 → 1 → 2 → 3 → 4 costs 1 per edge, anything else 50.
        let n = 5;
        let mut d = vec![vec![50u64; n]; n];
        for i in 0..n {
            d[i][i] = 0;
            d[i][(i + 1) % n] = 1;
        }
        let m = DistanceMatrix::from_rows(d).unwrap();
        let mut f = TspObjective::new(&m, Budget::default(), 1);
        // Cutting after positions 0 and 2 leaves S0 = 2 1 0 and S1 = 3 4;
        // only S0 reversed restores the ring.
        let mut tour = vec![0, 3, 4, 2, 1];
        let length = m.tour_length(&tour);
        assert_eq!(length, 201);

        let improved = KOpt::new(KOptConfig::new(2))
            .unwrap()
            .improve(&mut tour, length, &mut f);
        assert_eq!(improved, 5);
        assert_eq!(canonical(&tour), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_local_optimum_is_stable() {
        for symmetric in [true, false] {
            let m = random_matrix(12, symmetric, 11);
            let mut rng = Randomizer::new(12);
            let mut tour = random_tour(12, &mut rng);
            let length = m.tour_length(&tour);
            let mut f = TspObjective::new(&m, Budget::default(), 1);
            let mut kopt = KOpt::new(KOptConfig::new(3).with_until_local_optimum(true)).unwrap();

            let local = kopt.improve(&mut tour, length, &mut f);
            let snapshot = tour.clone();
            let fes = f.fes();
            let again = kopt.improve(&mut tour, local, &mut f);

            assert_eq!(again, local);
            assert_eq!(tour, snapshot);
            assert_eq!(f.fes(), fes);
        }
    }

    #[test]
    fn test_name() {
        let kopt = KOpt::new(KOptConfig::new(5)).unwrap();
        assert_eq!(kopt.name(), "5-opt");
        assert!(KOpt::new(KOptConfig::new(9)).is_err());
    }

    proptest! {
        #[test]
        fn prop_never_worsens(
            n in 4usize..11,
            k in 2usize..5,
            symmetric in any::<bool>(),
            seed in any::<i64>(),
        ) {
            let m = random_matrix(n, symmetric, seed);
            let mut rng = Randomizer::new(seed ^ 0x5555);
            let mut tour = random_tour(n, &mut rng);
            let length = m.tour_length(&tour);
            let mut f = TspObjective::new(&m, Budget::default(), seed);
            let mut kopt = KOpt::new(KOptConfig::new(k)).unwrap();
            kopt.begin_run(n);

            let improved = kopt.improve(&mut tour, length, &mut f);
            prop_assert!(improved <= length);
            prop_assert!(is_valid_tour(&tour, n));
            prop_assert_eq!(m.tour_length(&tour), improved);
            prop_assert!(f.fes() <= 1);
            prop_assert_eq!(f.fes() == 1, improved < length);
        }
    }
}
