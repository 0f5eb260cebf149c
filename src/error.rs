//! Error type shared by every solver in the crate.

use thiserror::Error;

/// Failures raised while validating an MDP or running one of the solvers.
#[derive(Debug, Error)]
pub enum Error {
    /// The linear system `(I - gamma * P_pi) V = R_pi` has no unique solution.
    #[error("singular linear system: pivot {pivot:e} at row {row}")]
    Numerical { pivot: f64, row: usize },

    /// A solver ran out of iterations before meeting its stopping criterion.
    #[error("{algorithm} did not converge within {iterations} iterations")]
    Convergence {
        algorithm: &'static str,
        iterations: usize,
    },

    #[error("invalid MDP: {0}")]
    InvalidMdp(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, Error>;
