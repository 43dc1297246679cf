//! Reconnection patterns of a pure j-opt move.
//!
//! Cutting j edges of a tour splits it into segments `S0 .. S(j-1)` in tour
//! order, where `S0` holds the wrap-around. A reconnection puts `S0` in front
//! and visits the other segments in some order, each one forward or
//! reversed. On symmetric instances `S0` always stays forward, since a tour
//! and its reversal are the same cycle. On asymmetric instances `S0` may be
//! reversed as well.

use super::config::MAX_K;

/// One way to reassemble the segments after the cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reconnection {
    /// Segment indices `1..j` in the order they follow `S0`.
    order: [u8; MAX_K - 1],
    /// Bit `s` is set when segment `s` is traversed reversed.
    reversed: u8,
    len: u8,
}

impl Reconnection {
    /// Segments following `S0`, in visiting order.
    #[inline]
    pub(crate) fn order(&self) -> &[u8] {
        &self.order[..usize::from(self.len)]
    }

    /// Reversal mask over segments `0..j`.
    #[inline]
    pub(crate) fn reversed_mask(&self) -> u8 {
        self.reversed
    }

    #[inline]
    pub(crate) fn is_reversed(&self, segment: u8) -> bool {
        (self.reversed >> segment) & 1 == 1
    }

    /// Whether this forward-headed pattern stays pure when `S0` and every
    /// segment in `singletons` are read as reversed.
    ///
    /// A single-node `S0` is forward and reversed at once, so the tour this
    /// pattern builds is also the mirror-headed pattern with those labels.
    /// Rejecting it here keeps the whole-tour reversal and mirrored
    /// lower-order moves out of the neighborhood.
    pub(crate) fn is_mirror_pure(&self, singletons: u8) -> bool {
        let mask = self.reversed | singletons | 1;
        let at = |p: u8| {
            let s = if p == 0 { 0 } else { self.order[usize::from(p - 1)] };
            (s, (mask >> s) & 1 == 1)
        };
        is_pure(self.len + 1, at, false, true)
    }
}

/// Lexicographic successor; `false` once the last permutation was passed.
pub(super) fn next_permutation(items: &mut [u8]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

/// Whether no adjacent pair of the sequence `at(0) .. at(j - 1)` restores a
/// removed edge.
///
/// Under the segment model a removed edge is `last(S_i) → first(S_i+1)`.
/// It is restored when `S_i` forward is directly followed by `S_i+1`
/// forward (`forward_check`). Its reversal appears when `S_i+1` reversed is
/// directly followed by `S_i` reversed (`reverse_check`). That is the same
/// edge on symmetric instances, and on asymmetric ones it marks the mirror
/// of a pattern that restores one.
fn is_pure(j: u8, at: impl Fn(u8) -> (u8, bool), forward_check: bool, reverse_check: bool) -> bool {
    (0..j).all(|p| {
        let (x, x_rev) = at(p);
        let (y, y_rev) = at((p + 1) % j);
        let forward_restore = forward_check && y == (x + 1) % j && !x_rev && !y_rev;
        let reverse_restore = reverse_check && x == (y + 1) % j && x_rev && y_rev;
        !forward_restore && !reverse_restore
    })
}

/// Every pure reconnection of a j-opt move.
///
/// Reversed-head patterns are the mirrors of forward-head ones, so they are
/// checked with the mirrored restore test only.
///
/// # Panics
/// Panics unless `2 <= j <= 7`.
pub(crate) fn reconnections(j: usize, symmetric: bool) -> Vec<Reconnection> {
    assert!((2..=MAX_K).contains(&j), "move order must be in [2, {MAX_K}], got {j}");
    let inner = j - 1;
    let heads: &[bool] = if symmetric { &[false] } else { &[false, true] };
    let mut out = Vec::new();

    for &head_reversed in heads {
        let mut order: Vec<u8> = (1..j as u8).collect();
        loop {
            for inner_mask in 0u8..(1 << inner) {
                let reversed = (inner_mask << 1) | u8::from(head_reversed);
                let at = |p: u8| {
                    let s = if p == 0 { 0 } else { order[usize::from(p - 1)] };
                    (s, (reversed >> s) & 1 == 1)
                };
                let forward_check = symmetric || !head_reversed;
                let reverse_check = symmetric || head_reversed;
                if is_pure(j as u8, at, forward_check, reverse_check) {
                    let mut packed = [0u8; MAX_K - 1];
                    packed[..inner].copy_from_slice(&order);
                    out.push(Reconnection {
                        order: packed,
                        reversed,
                        len: inner as u8,
                    });
                }
            }
            if !next_permutation(&mut order) {
                break;
            }
        }
    }
    out
}
