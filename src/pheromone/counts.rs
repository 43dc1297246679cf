//! Fixed-capacity per-node neighbor lists with use counts.

/// For every node a small unordered list of `(neighbor, count)` entries.
///
/// Entries with a count of zero are removed immediately, so a row only ever
/// holds neighbors that are in use.
#[derive(Debug, Clone)]
pub(crate) struct EdgeCounts {
    capacity: usize,
    neighbors: Vec<usize>,
    counts: Vec<u32>,
    used: Vec<usize>,
}

impl EdgeCounts {
    pub(crate) fn new(n: usize, capacity: usize) -> Self {
        Self {
            capacity,
            neighbors: vec![0; n * capacity],
            counts: vec![0; n * capacity],
            used: vec![0; n],
        }
    }

    #[inline]
    fn row(&self, u: usize) -> std::ops::Range<usize> {
        let start = u * self.capacity;
        start..start + self.used[u]
    }

    #[inline]
    fn find(&self, u: usize, v: usize) -> Option<usize> {
        let row = self.row(u);
        let start = row.start;
        self.neighbors[row].iter().position(|&x| x == v).map(|i| start + i)
    }

    /// Use count of the entry `u → v`.
    #[inline]
    pub(crate) fn count(&self, u: usize, v: usize) -> u32 {
        self.find(u, v).map_or(0, |slot| self.counts[slot])
    }

    pub(crate) fn increment(&mut self, u: usize, v: usize) {
        if let Some(slot) = self.find(u, v) {
            self.counts[slot] += 1;
            return;
        }
        assert!(
            self.used[u] < self.capacity,
            "node {u} already has {} pheromone entries; more tours were added than the population holds",
            self.capacity
        );
        let slot = u * self.capacity + self.used[u];
        self.neighbors[slot] = v;
        self.counts[slot] = 1;
        self.used[u] += 1;
    }

    pub(crate) fn decrement(&mut self, u: usize, v: usize) {
        let Some(slot) = self.find(u, v) else {
            panic!("edge ({u}, {v}) has no pheromone to remove; the tour was never added");
        };
        self.counts[slot] -= 1;
        if self.counts[slot] == 0 {
            let last = u * self.capacity + self.used[u] - 1;
            self.neighbors.swap(slot, last);
            self.counts.swap(slot, last);
            self.used[u] -= 1;
        }
    }

    /// Sum of all counts stored in row `u`.
    pub(crate) fn row_total(&self, u: usize) -> u64 {
        self.counts[self.row(u)].iter().map(|&c| u64::from(c)).sum()
    }

    /// Entries `(neighbor, count)` of row `u`.
    pub(crate) fn entries(&self, u: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        let row = self.row(u);
        self.neighbors[row.clone()]
            .iter()
            .copied()
            .zip(self.counts[row].iter().copied())
    }

    pub(crate) fn clear(&mut self) {
        self.used.iter_mut().for_each(|u| *u = 0);
    }

    pub(crate) fn nodes(&self) -> usize {
        self.used.len()
    }
}
