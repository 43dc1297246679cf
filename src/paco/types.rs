//! Ants and the resident population.

use crate::pheromone::PheromoneStore;

/// One candidate solution with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ant {
    /// Visiting order; a permutation of the node ids.
    pub tour: Vec<usize>,

    /// Total length of the cyclic tour.
    pub length: u64,

    /// Generation in which the tour was built.
    pub birthday: u64,
}

impl Ant {
    pub fn new(tour: Vec<usize>, length: u64, birthday: u64) -> Self {
        Self {
            tour,
            length,
            birthday,
        }
    }

    /// Overwrites this ant with `other`, reusing the tour allocation.
    pub fn copy_from(&mut self, other: &Ant) {
        self.tour.clone_from(&other.tour);
        self.length = other.length;
        self.birthday = other.birthday;
    }
}

/// The resident solutions from which the pheromone is derived.
///
/// Every insertion adds the tour to the pheromone store and every
/// eviction removes it before the slot is reused, so the store always
/// reflects exactly the residents.
#[derive(Debug, Clone, Default)]
pub struct Population {
    ants: Vec<Ant>,
    capacity: usize,
}

impl Population {
    /// An empty population holding at most `capacity` ants.
    pub fn new(capacity: usize) -> Self {
        Self {
            ants: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.ants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ants.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.ants.len() >= self.capacity
    }

    /// Residents in slot order.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Appends a copy of `ant` and adds its tour to `pheromones`.
    ///
    /// # Panics
    /// Panics if the population is full.
    pub fn insert(&mut self, ant: &Ant, pheromones: &mut dyn PheromoneStore) {
        assert!(
            !self.is_full(),
            "population already holds {} ants",
            self.capacity
        );
        pheromones.add(&ant.tour);
        self.ants.push(ant.clone());
    }

    /// Evicts the resident in `slot` and puts a copy of `ant` there.
    ///
    /// # Panics
    /// Panics if `slot` is not occupied.
    pub fn replace(&mut self, slot: usize, ant: &Ant, pheromones: &mut dyn PheromoneStore) {
        assert!(slot < self.ants.len(), "population slot {slot} is empty");
        pheromones.remove(&self.ants[slot].tour);
        pheromones.add(&ant.tour);
        self.ants[slot].copy_from(ant);
    }

    /// Slot of the shortest resident (first on ties).
    pub fn best_slot(&self) -> Option<usize> {
        self.first_by(|a, b| a.length < b.length)
    }

    /// Slot of the longest resident (first on ties).
    pub fn worst_slot(&self) -> Option<usize> {
        self.first_by(|a, b| a.length > b.length)
    }

    /// Slot of the resident with the smallest birthday (first on ties).
    pub fn oldest_slot(&self) -> Option<usize> {
        self.first_by(|a, b| a.birthday < b.birthday)
    }

    /// First slot `i` such that no later slot `j` has `better(ants[j], ants[i])`.
    fn first_by(&self, better: impl Fn(&Ant, &Ant) -> bool) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, ant) in self.ants.iter().enumerate() {
            if best.is_none_or(|b| better(ant, &self.ants[b])) {
                best = Some(i);
            }
        }
        best
    }

    /// Drops all residents without touching any pheromone store.
    pub fn clear(&mut self) {
        self.ants.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pheromone::PheromoneMatrix;

    #[test]
    fn test_insert_adds_pheromone() {
        let mut store = PheromoneMatrix::new(4, 2, 1.0, true);
        let mut pop = Population::new(2);
        pop.insert(&Ant::new(vec![0, 1, 2, 3], 10, 1), &mut store);
        assert_eq!(pop.len(), 1);
        assert_eq!(store.residents(), 1);
        assert_eq!(store.count(0, 1), 1);
    }

    #[test]
    fn test_replace_swaps_pheromone() {
        let mut store = PheromoneMatrix::new(4, 1, 1.0, false);
        let mut pop = Population::new(1);
        pop.insert(&Ant::new(vec![0, 1, 2, 3], 10, 1), &mut store);
        pop.replace(0, &Ant::new(vec![0, 3, 2, 1], 8, 2), &mut store);
        assert_eq!(store.count(0, 1), 0);
        assert_eq!(store.count(0, 3), 1);
        assert_eq!(store.residents(), 1);
        assert_eq!(pop.ants()[0].birthday, 2);
    }

    #[test]
    #[should_panic(expected = "population already holds")]
    fn test_insert_into_full_panics() {
        let mut store = PheromoneMatrix::new(3, 1, 1.0, true);
        let mut pop = Population::new(1);
        pop.insert(&Ant::new(vec![0, 1, 2], 3, 1), &mut store);
        pop.insert(&Ant::new(vec![0, 1, 2], 3, 1), &mut store);
    }

    #[test]
    fn test_slot_queries_prefer_first() {
        let mut store = PheromoneMatrix::new(3, 3, 1.0, true);
        let mut pop = Population::new(3);
        assert_eq!(pop.best_slot(), None);
        pop.insert(&Ant::new(vec![0, 1, 2], 5, 2), &mut store);
        pop.insert(&Ant::new(vec![0, 2, 1], 3, 1), &mut store);
        pop.insert(&Ant::new(vec![1, 0, 2], 3, 1), &mut store);
        assert_eq!(pop.best_slot(), Some(1));
        assert_eq!(pop.worst_slot(), Some(0));
        assert_eq!(pop.oldest_slot(), Some(1));
        assert!(pop.is_full());
    }
}
