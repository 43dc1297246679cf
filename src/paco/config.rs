//! PACO configuration, named parameters and strategy selectors.

use crate::error::PacoError;
use crate::local::KOptConfig;
use std::fmt::Write as _;

/// How the population is updated at the end of every round of ants.
///
/// Every variant first fills the population; they differ in which
/// resident leaves once it is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateStrategy {
    /// The oldest resident leaves, provided the round's best is not longer.
    #[default]
    Age,

    /// Plain FIFO: the oldest resident leaves and the round's best always
    /// enters.
    Fifo,

    /// The worst resident leaves, but only for a strictly shorter tour.
    Quality,

    /// Like `Age`, but the shortest resident never leaves.
    ElitistAge,
}

impl UpdateStrategy {
    /// Name used in logs and [`PacoConfig::describe`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Fifo => "fifo",
            Self::Quality => "quality",
            Self::ElitistAge => "elitist-age",
        }
    }
}

/// How the population is seeded before the first ant runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialPopulation {
    /// Start empty; ants fill the population.
    #[default]
    Empty,

    /// Nearest-neighbor tours from distinct random start nodes, one per
    /// population slot (at most `n`).
    NearestNeighbor,
}

impl InitialPopulation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NearestNeighbor => "nearest-neighbor",
        }
    }
}

/// A named numeric parameter and its valid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    /// Key accepted by [`PacoConfig::set_param`].
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    /// Whether the value must be a whole number.
    pub integer: bool,
    pub description: &'static str,
}

/// Configuration for the PACO engine.
///
/// # Examples
///
/// ```
/// use u_paco::paco::{PacoConfig, UpdateStrategy};
/// use u_paco::local::KOptConfig;
///
/// let config = PacoConfig::default()
///     .with_population_size(3)
///     .with_q0(0.5)
///     .with_update(UpdateStrategy::Quality)
///     .with_local_search(KOptConfig::new(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacoConfig {
    /// Pheromone exponent.
    pub alpha: f64,

    /// Heuristic (inverse distance) exponent.
    pub beta: f64,

    /// Number of resident solutions `k`.
    pub population_size: usize,

    /// Probability of choosing the best candidate deterministically.
    pub q0: f64,

    /// Upper bound of the pheromone intensity.
    pub tau_max: f64,

    /// Ants `m` per round; the population is updated after every round.
    pub ants_per_iteration: usize,

    /// Population update policy.
    pub update: UpdateStrategy,

    /// Seeding of the population before the first round.
    pub initial_population: InitialPopulation,

    /// Optional k-opt applied to every constructed tour.
    pub local_search: Option<KOptConfig>,
}

impl Default for PacoConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 5.0,
            population_size: 5,
            q0: 0.9,
            tau_max: 1.0,
            ants_per_iteration: 10,
            update: UpdateStrategy::Age,
            initial_population: InitialPopulation::Empty,
            local_search: None,
        }
    }
}

impl PacoConfig {
    /// Every named numeric parameter with its valid range.
    pub const PARAMETERS: &'static [ParameterSpec] = &[
        ParameterSpec {
            name: "alpha",
            min: 0.0,
            max: 1000.0,
            integer: false,
            description: "exponent of the pheromone intensity",
        },
        ParameterSpec {
            name: "beta",
            min: 0.0,
            max: 1000.0,
            integer: false,
            description: "exponent of the heuristic value 1/distance",
        },
        ParameterSpec {
            name: "populationSize",
            min: 1.0,
            max: 10000.0,
            integer: true,
            description: "number of resident solutions",
        },
        ParameterSpec {
            name: "q0",
            min: 0.0,
            max: 1.0,
            integer: false,
            description: "probability of a deterministic best-candidate decision",
        },
        ParameterSpec {
            name: "tauMax",
            min: 0.5,
            max: 100000.0,
            integer: false,
            description: "upper bound of the pheromone intensity",
        },
        ParameterSpec {
            name: "antsPerIteration",
            min: 1.0,
            max: 10000.0,
            integer: true,
            description: "ants constructed between two population updates",
        },
    ];

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_population_size(mut self, k: usize) -> Self {
        self.population_size = k;
        self
    }

    pub fn with_q0(mut self, q0: f64) -> Self {
        self.q0 = q0;
        self
    }

    pub fn with_tau_max(mut self, tau_max: f64) -> Self {
        self.tau_max = tau_max;
        self
    }

    pub fn with_ants_per_iteration(mut self, m: usize) -> Self {
        self.ants_per_iteration = m;
        self
    }

    pub fn with_update(mut self, update: UpdateStrategy) -> Self {
        self.update = update;
        self
    }

    pub fn with_initial_population(mut self, init: InitialPopulation) -> Self {
        self.initial_population = init;
        self
    }

    pub fn with_local_search(mut self, local_search: KOptConfig) -> Self {
        self.local_search = Some(local_search);
        self
    }

    /// Current value of a named parameter.
    ///
    /// # Errors
    /// Returns [`PacoError::UnknownParameter`] for names not listed in
    /// [`PARAMETERS`](Self::PARAMETERS).
    pub fn get_param(&self, name: &str) -> Result<f64, PacoError> {
        Ok(match name {
            "alpha" => self.alpha,
            "beta" => self.beta,
            "populationSize" => self.population_size as f64,
            "q0" => self.q0,
            "tauMax" => self.tau_max,
            "antsPerIteration" => self.ants_per_iteration as f64,
            _ => return Err(PacoError::UnknownParameter(name.to_string())),
        })
    }

    /// Sets a named parameter after checking its range.
    ///
    /// Out-of-range values are rejected, never clamped; the configuration
    /// is unchanged on error.
    ///
    /// # Errors
    /// Returns [`PacoError::UnknownParameter`] or
    /// [`PacoError::InvalidParameter`].
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<(), PacoError> {
        let spec = Self::spec(name)?;
        check(spec, value)?;
        match name {
            "alpha" => self.alpha = value,
            "beta" => self.beta = value,
            "populationSize" => self.population_size = value as usize,
            "q0" => self.q0 = value,
            "tauMax" => self.tau_max = value,
            "antsPerIteration" => self.ants_per_iteration = value as usize,
            _ => return Err(PacoError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    fn spec(name: &str) -> Result<&'static ParameterSpec, PacoError> {
        Self::PARAMETERS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PacoError::UnknownParameter(name.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), PacoError> {
        for spec in Self::PARAMETERS {
            check(spec, self.get_param(spec.name)?)?;
        }
        if let Some(local_search) = &self.local_search {
            local_search.validate()?;
        }
        Ok(())
    }

    /// One `key: value` line per setting.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for spec in Self::PARAMETERS {
            if let Ok(value) = self.get_param(spec.name) {
                let _ = writeln!(out, "{}: {}", spec.name, value);
            }
        }
        let _ = writeln!(out, "update: {}", self.update.as_str());
        let _ = writeln!(out, "initialPopulation: {}", self.initial_population.as_str());
        match &self.local_search {
            Some(ls) => {
                let _ = writeln!(out, "localSearch: {}-opt", ls.k);
            }
            None => {
                let _ = writeln!(out, "localSearch: none");
            }
        }
        out
    }
}

fn check(spec: &ParameterSpec, value: f64) -> Result<(), PacoError> {
    let in_range = value >= spec.min && value <= spec.max;
    if !in_range || (spec.integer && value.fract() != 0.0) {
        return Err(PacoError::invalid_parameter(spec.name, value, spec.min, spec.max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PacoConfig::default();
        assert!((config.alpha - 1.0).abs() < 1e-12);
        assert!((config.beta - 5.0).abs() < 1e-12);
        assert_eq!(config.population_size, 5);
        assert!((config.q0 - 0.9).abs() < 1e-12);
        assert!((config.tau_max - 1.0).abs() < 1e-12);
        assert_eq!(config.ants_per_iteration, 10);
        assert_eq!(config.update, UpdateStrategy::Age);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(PacoConfig::default().with_q0(1.5).validate().is_err());
        assert!(PacoConfig::default().with_alpha(-0.1).validate().is_err());
        assert!(PacoConfig::default().with_tau_max(0.25).validate().is_err());
        assert!(PacoConfig::default().with_population_size(0).validate().is_err());
        assert!(PacoConfig::default().with_ants_per_iteration(10001).validate().is_err());
        assert!(PacoConfig::default().with_beta(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_checks_local_search() {
        let config = PacoConfig::default().with_local_search(KOptConfig::new(8));
        assert!(matches!(
            config.validate(),
            Err(PacoError::InvalidLocalSearch(_))
        ));
    }

    #[test]
    fn test_set_param() {
        let mut config = PacoConfig::default();
        config.set_param("q0", 0.25).unwrap();
        config.set_param("populationSize", 7.0).unwrap();
        assert!((config.q0 - 0.25).abs() < 1e-12);
        assert_eq!(config.population_size, 7);
        assert_eq!(config.get_param("populationSize").unwrap(), 7.0);
    }

    #[test]
    fn test_set_param_rejects_without_clamping() {
        let mut config = PacoConfig::default();
        let err = config.set_param("tauMax", 0.1).unwrap_err();
        assert_eq!(
            err,
            PacoError::InvalidParameter {
                name: "tauMax".into(),
                value: 0.1,
                min: 0.5,
                max: 100000.0,
            }
        );
        assert!((config.tau_max - 1.0).abs() < 1e-12);
        assert!(config.set_param("antsPerIteration", 2.5).is_err());
        assert_eq!(config.ants_per_iteration, 10);
    }

    #[test]
    fn test_unknown_parameter() {
        let mut config = PacoConfig::default();
        assert_eq!(
            config.set_param("gamma", 1.0),
            Err(PacoError::UnknownParameter("gamma".into()))
        );
        assert!(config.get_param("gamma").is_err());
    }

    #[test]
    fn test_describe() {
        let text = PacoConfig::default()
            .with_local_search(KOptConfig::new(3))
            .describe();
        assert!(text.contains("alpha: 1\n"));
        assert!(text.contains("populationSize: 5\n"));
        assert!(text.contains("update: age\n"));
        assert!(text.contains("localSearch: 3-opt\n"));
    }
}
