//! Population update strategies.

use super::config::UpdateStrategy;
use super::types::{Ant, Population};
use crate::pheromone::PheromoneStore;

/// Decides how the best ant of a round changes the population.
///
/// Implementations only choose slots; [`Population::insert`] and
/// [`Population::replace`] keep the pheromone store in step.
pub trait PopulationUpdate {
    /// Offers `candidate` to the population. Returns whether it entered.
    fn update(
        &mut self,
        population: &mut Population,
        candidate: &Ant,
        pheromones: &mut dyn PheromoneStore,
    ) -> bool;

    /// Called once before a run.
    fn begin_run(&mut self) {}

    /// Called once after a run.
    fn end_run(&mut self) {}

    fn name(&self) -> &str;
}

impl UpdateStrategy {
    /// Creates the strategy object.
    pub fn build(&self) -> Box<dyn PopulationUpdate> {
        match self {
            Self::Age => Box::new(AgeUpdate),
            Self::Fifo => Box::new(FifoUpdate),
            Self::Quality => Box::new(QualityUpdate),
            Self::ElitistAge => Box::new(ElitistAgeUpdate),
        }
    }
}

/// Fills the population; once full, the oldest resident leaves for a
/// candidate that is not longer than it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeUpdate;

impl PopulationUpdate for AgeUpdate {
    fn update(
        &mut self,
        population: &mut Population,
        candidate: &Ant,
        pheromones: &mut dyn PheromoneStore,
    ) -> bool {
        if !population.is_full() {
            population.insert(candidate, pheromones);
            return true;
        }
        match population.oldest_slot() {
            Some(slot) if candidate.length <= population.ants()[slot].length => {
                population.replace(slot, candidate, pheromones);
                true
            }
            _ => false,
        }
    }

    fn name(&self) -> &str {
        "age"
    }
}

/// Fills the population; once full, the oldest resident always leaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoUpdate;

impl PopulationUpdate for FifoUpdate {
    fn update(
        &mut self,
        population: &mut Population,
        candidate: &Ant,
        pheromones: &mut dyn PheromoneStore,
    ) -> bool {
        match population.oldest_slot() {
            Some(slot) if population.is_full() => population.replace(slot, candidate, pheromones),
            _ => population.insert(candidate, pheromones),
        }
        true
    }

    fn name(&self) -> &str {
        "fifo"
    }
}

/// Fills the population; once full, a strictly shorter candidate
/// replaces the longest resident.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityUpdate;

impl PopulationUpdate for QualityUpdate {
    fn update(
        &mut self,
        population: &mut Population,
        candidate: &Ant,
        pheromones: &mut dyn PheromoneStore,
    ) -> bool {
        if !population.is_full() {
            population.insert(candidate, pheromones);
            return true;
        }
        match population.worst_slot() {
            Some(slot) if candidate.length < population.ants()[slot].length => {
                population.replace(slot, candidate, pheromones);
                true
            }
            _ => false,
        }
    }

    fn name(&self) -> &str {
        "quality"
    }
}

/// Fills the population; once full, the oldest resident that is not the
/// shortest one leaves.
///
/// With a single slot the resident is only replaced by a tour that is not
/// longer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElitistAgeUpdate;

impl PopulationUpdate for ElitistAgeUpdate {
    fn update(
        &mut self,
        population: &mut Population,
        candidate: &Ant,
        pheromones: &mut dyn PheromoneStore,
    ) -> bool {
        if !population.is_full() {
            population.insert(candidate, pheromones);
            return true;
        }
        let Some(elite) = population.best_slot() else {
            return false;
        };
        if population.len() == 1 {
            if candidate.length <= population.ants()[elite].length {
                population.replace(elite, candidate, pheromones);
                return true;
            }
            return false;
        }

        let mut victim: Option<usize> = None;
        for (slot, ant) in population.ants().iter().enumerate() {
            if slot == elite {
                continue;
            }
            if victim.is_none_or(|v| ant.birthday < population.ants()[v].birthday) {
                victim = Some(slot);
            }
        }
        match victim {
            Some(slot) => {
                population.replace(slot, candidate, pheromones);
                true
            }
            None => false,
        }
    }

    fn name(&self) -> &str {
        "elitist-age"
    }
}
