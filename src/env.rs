//! Data sources that build tabular MDPs for the solvers.

pub mod cliff_walk;
pub mod random;

pub use cliff_walk::CliffWalk;
pub use random::random_mdp;
