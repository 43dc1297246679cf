//! k-opt configuration.

use crate::error::PacoError;

/// Largest supported neighborhood order.
pub(crate) const MAX_K: usize = 7;

/// Configuration for [`KOpt`](super::KOpt).
///
/// # Examples
///
/// ```
/// use u_paco::local::KOptConfig;
///
/// let config = KOptConfig::new(3)
///     .with_until_local_optimum(true)
///     .with_max_evaluations_per_pass(50_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KOptConfig {
    /// Largest number of edges removed by one move, in `2..=7`.
    ///
    /// A pass also considers every smaller order down to 2-opt.
    pub k: usize,

    /// Repeat passes until no improving move is left.
    ///
    /// When `false` a single pass is made and at most one move applied.
    pub until_local_optimum: bool,

    /// Caps the reconnections scored in one pass. `None` = exhaustive.
    pub max_evaluations_per_pass: Option<u64>,
}

impl Default for KOptConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

impl KOptConfig {
    /// A single-pass, uncapped k-opt.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            until_local_optimum: false,
            max_evaluations_per_pass: None,
        }
    }

    pub fn with_until_local_optimum(mut self, enabled: bool) -> Self {
        self.until_local_optimum = enabled;
        self
    }

    pub fn with_max_evaluations_per_pass(mut self, n: u64) -> Self {
        self.max_evaluations_per_pass = Some(n);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), PacoError> {
        if !(2..=MAX_K).contains(&self.k) {
            return Err(PacoError::InvalidLocalSearch(format!(
                "k must be in [2, {MAX_K}], got {}",
                self.k
            )));
        }
        if self.max_evaluations_per_pass == Some(0) {
            return Err(PacoError::InvalidLocalSearch(
                "max_evaluations_per_pass must be positive or None".into(),
            ));
        }
        Ok(())
    }
}
