pub mod policy_evaluation;
pub mod policy_iteration;
pub mod value_iteration;

use crate::error::{Error, Result};

// Re-export dynamic programming solvers with descriptive names
pub use policy_evaluation::{policy_evaluation, policy_evaluation_residual};
pub use policy_iteration::{policy_iteration, policies_match, PolicyIterationResult};
pub use value_iteration::{value_iteration, ValueIterationResult};

/// Stopping parameters shared by the iterative solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Policy iteration: elementwise tolerance between consecutive policies.
    /// Value iteration: infinity-norm tolerance between consecutive value functions.
    pub tolerance: f64,
    /// Upper bound on improvement steps (policy iteration) or Bellman backups
    /// (value iteration) before giving up with [`Error::Convergence`].
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
