//! Core trait for local improvement procedures.

use crate::objective::ObjectiveFunction;

/// A procedure that tries to shorten a complete tour in place.
///
/// # Contract
///
/// - `improve` never returns a length greater than the one it was given.
/// - The returned length equals the length of `tour` after the call.
/// - Every complete tour the procedure produces is registered through
///   [`ObjectiveFunction::register_fe`]; partial evaluations are reported
///   through [`ObjectiveFunction::register_de`].
pub trait LocalImprover {
    /// Prepares scratch storage for instances with `n` nodes.
    fn begin_run(&mut self, _n: usize) {}

    /// Improves `tour`, whose current length is `length`, and returns the
    /// new length.
    fn improve(&mut self, tour: &mut [usize], length: u64, f: &mut dyn ObjectiveFunction) -> u64;

    /// Releases scratch storage.
    fn end_run(&mut self) {}

    /// Human-readable name, used in logs.
    fn name(&self) -> String;
}
