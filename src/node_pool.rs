//! Set of not-yet-visited nodes used while an ant builds its tour.
//!
//! Tour construction needs three operations on the unvisited set, all in
//! O(1): draw a random node, enumerate the remaining nodes by position, and
//! delete a node by its id once it has been chosen. [`NodePool`] keeps the
//! live ids packed at the front of an array together with an inverse index
//! table, and deletes by swapping with the last live slot.

use crate::random::Randomizer;

/// Packed array of unvisited node ids with an id → slot index.
///
/// Slots `[0, remaining)` hold exactly the unvisited ids. The order of the
/// live slots changes with every deletion.
///
/// # Panics
///
/// All operations treat misuse (deleting an absent id, draining an empty
/// pool) as a contract violation and panic.
///
/// # Examples
///
/// ```
/// use u_paco::node_pool::NodePool;
/// use u_paco::random::Randomizer;
///
/// let mut pool = NodePool::new(4);
/// let mut rng = Randomizer::new(1);
/// let first = pool.delete_random(&mut rng);
/// pool.delete_by_id((first + 1) % 4);
/// pool.delete_by_id((first + 2) % 4);
/// assert_eq!(pool.delete_last(), (first + 3) % 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodePool {
    nodes: Vec<usize>,
    positions: Vec<usize>,
    remaining: usize,
}

impl NodePool {
    /// Creates a pool holding the ids `0..n`.
    pub fn new(n: usize) -> Self {
        let mut pool = Self::default();
        pool.init(n);
        pool
    }

    /// Resets the pool to hold the ids `0..n`, reusing the allocation.
    pub fn init(&mut self, n: usize) {
        self.nodes.clear();
        self.nodes.extend(0..n);
        self.positions.clear();
        self.positions.extend(0..n);
        self.remaining = n;
    }

    /// Number of ids still in the pool.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether every id has been deleted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Whether `id` is still in the pool.
    pub fn contains(&self, id: usize) -> bool {
        id < self.positions.len() && self.positions[id] < self.remaining
    }

    /// Returns the id at live slot `index` without removing it.
    ///
    /// # Panics
    /// Panics if `index >= remaining()`.
    #[inline]
    pub fn get_by_index(&self, index: usize) -> usize {
        assert!(
            index < self.remaining,
            "slot {index} is not live ({} nodes remain)",
            self.remaining
        );
        self.nodes[index]
    }

    /// Removes and returns a uniformly chosen id.
    ///
    /// # Panics
    /// Panics if the pool is empty.
    pub fn delete_random(&mut self, rng: &mut Randomizer) -> usize {
        assert!(self.remaining > 0, "cannot draw from an empty node pool");
        let index = rng.next_int(self.remaining);
        let id = self.nodes[index];
        self.remove_slot(index);
        id
    }

    /// Removes `id` from the pool regardless of its slot.
    ///
    /// # Panics
    /// Panics if `id` is out of range or was already removed.
    pub fn delete_by_id(&mut self, id: usize) {
        assert!(
            self.contains(id),
            "node {id} is not in the pool ({} nodes remain)",
            self.remaining
        );
        let index = self.positions[id];
        self.remove_slot(index);
    }

    /// Removes and returns the single remaining id.
    ///
    /// # Panics
    /// Panics unless exactly one id remains.
    pub fn delete_last(&mut self) -> usize {
        assert_eq!(
            self.remaining, 1,
            "delete_last requires exactly one remaining node"
        );
        self.remaining = 0;
        self.nodes[0]
    }

    /// Swaps slot `index` with the last live slot and shrinks the live range.
    fn remove_slot(&mut self, index: usize) {
        let last = self.remaining - 1;
        let moved = self.nodes[last];
        let removed = self.nodes[index];

        self.nodes.swap(index, last);
        self.positions[moved] = index;
        self.positions[removed] = last;
        self.remaining = last;
    }
}
