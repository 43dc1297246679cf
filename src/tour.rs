//! Helpers for cyclic tours represented as node-id slices.
//!
//! A tour over `n` nodes is a permutation of `0..n`; the last node
//! connects back to the first.

use crate::node_pool::NodePool;
use crate::random::Randomizer;

/// Total length of a cyclic tour, including the closing edge.
///
/// Returns 0 for empty tours.
pub fn tour_length<D>(tour: &[usize], distance: D) -> u64
where
    D: Fn(usize, usize) -> u64,
{
    match (tour.first(), tour.last()) {
        (Some(&first), Some(&last)) => {
            tour.windows(2).map(|w| distance(w[0], w[1])).sum::<u64>() + distance(last, first)
        }
        _ => 0,
    }
}

/// Whether `tour` visits every id in `0..n` exactly once.
pub fn is_valid_tour(tour: &[usize], n: usize) -> bool {
    if tour.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &node in tour {
        if node >= n || seen[node] {
            return false;
        }
        seen[node] = true;
    }
    true
}

/// Uniformly random tour over `n` nodes.
pub fn random_tour(n: usize, rng: &mut Randomizer) -> Vec<usize> {
    let mut tour: Vec<usize> = (0..n).collect();
    rng.shuffle_all(&mut tour);
    tour
}

/// Greedy nearest-neighbor tour starting at `start`.
///
/// Ties are broken in favour of the candidate found first while scanning
/// the remaining nodes.
///
/// # Panics
/// Panics if `start >= n`.
pub fn nearest_neighbor_tour<D>(n: usize, start: usize, distance: D) -> Vec<usize>
where
    D: Fn(usize, usize) -> u64,
{
    assert!(start < n, "start node {start} out of range for {n} nodes");

    let mut pool = NodePool::new(n);
    let mut tour = Vec::with_capacity(n);
    pool.delete_by_id(start);
    tour.push(start);

    let mut current = start;
    while !pool.is_empty() {
        let mut best = pool.get_by_index(0);
        let mut best_dist = distance(current, best);
        for slot in 1..pool.remaining() {
            let candidate = pool.get_by_index(slot);
            let d = distance(current, candidate);
            if d < best_dist {
                best = candidate;
                best_dist = d;
            }
        }
        pool.delete_by_id(best);
        tour.push(best);
        current = best;
    }

    tour
}
