use ndarray::{Array2, Array3, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::Result;
use crate::mdp::MarkovDecisionProcess;

/// Builds a dense random MDP, reproducible from `seed`.
///
/// Every transition row is drawn uniformly and normalised to sum to one, so
/// each state can reach every other state. Rewards are uniform in `[-1, 1)`.
///
/// # Errors
///
/// Returns [`Error::InvalidMdp`](crate::Error::InvalidMdp) for zero states or
/// actions, or for `gamma` outside `[0, 1]`.
pub fn random_mdp(
    num_states: usize,
    num_actions: usize,
    gamma: f64,
    seed: u64,
) -> Result<MarkovDecisionProcess> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let weight = Uniform::new(1e-3, 1.0);
    let reward = Uniform::new(-1.0, 1.0);

    let mut transitions =
        Array3::from_shape_fn((num_states, num_actions, num_states), |_| weight.sample(&mut rng));
    for mut row in transitions.lanes_mut(Axis(2)) {
        let total = row.sum();
        row.mapv_inplace(|p| p / total);
    }
    let rewards = Array2::from_shape_fn((num_states, num_actions), |_| reward.sample(&mut rng));

    MarkovDecisionProcess::new(transitions, rewards, gamma)
}
