pub mod dynamic;
pub mod env;
pub mod error;
pub mod math;
pub mod mdp;

pub use dynamic::{
    policy_evaluation, policy_iteration, value_iteration, PolicyIterationResult, SolverConfig,
    ValueIterationResult,
};
pub use error::{Error, Result};
pub use mdp::MarkovDecisionProcess;
