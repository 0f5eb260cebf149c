//! Policy iteration: exact policy evaluation alternated with greedy policy
//! improvement until the policy stops changing.

use log::{debug, info, warn};
use ndarray::Array1;

use crate::dynamic::policy_evaluation::policy_evaluation;
use crate::dynamic::SolverConfig;
use crate::error::{Error, Result};
use crate::mdp::{greedy_policy, MarkovDecisionProcess};

/// Outcome of [`policy_iteration`].
#[derive(Debug, Clone)]
pub struct PolicyIterationResult {
    /// The stable policy, one action per state.
    pub policy: Vec<usize>,
    /// Exact value function of `policy`.
    pub values: Array1<f64>,
    /// Number of policy evaluations performed.
    pub iterations: usize,
    /// Value function of every evaluated policy, in evaluation order. The last
    /// entry equals `values`.
    pub value_history: Vec<Array1<f64>>,
}

/// Runs policy iteration on `mdp`, starting from the policy that picks action
/// 0 in every state.
///
/// Each round evaluates the current policy exactly and builds the greedy
/// policy `argmax_a R[s, a] + gamma * sum_s' P[s, a, s'] * V[s']`, breaking ties
/// towards the lowest action index. The loop stops once the greedy policy
/// matches the current one elementwise within `config.tolerance` (for
/// tolerances below 1 this is exact equality).
///
/// # Errors
///
/// - [`Error::Numerical`] from the evaluation step.
/// - [`Error::Convergence`] if the policy is still changing after
///   `config.max_iterations` evaluations.
/// - [`Error::InvalidConfig`] for a negative or non-finite tolerance or a zero
///   iteration cap.
///
/// # Examples
///
/// ```
/// use mdp_planning::{policy_iteration, MarkovDecisionProcess, SolverConfig};
/// use ndarray::{array, Array3};
///
/// // state 0: action 0 stays (reward 1), action 1 moves to state 1 (reward 0)
/// // state 1: both actions stay (reward 0)
/// let mut p = Array3::zeros((2, 2, 2));
/// p[[0, 0, 0]] = 1.0;
/// p[[0, 1, 1]] = 1.0;
/// p[[1, 0, 1]] = 1.0;
/// p[[1, 1, 1]] = 1.0;
/// let mdp = MarkovDecisionProcess::new(p, array![[1.0, 0.0], [0.0, 0.0]], 0.9).unwrap();
///
/// let result = policy_iteration(&mdp, &SolverConfig::default()).unwrap();
/// assert_eq!(result.policy[0], 0);
/// assert!((result.values[0] - 10.0).abs() < 1e-9);
/// assert!(result.values[1].abs() < 1e-9);
/// ```
pub fn policy_iteration(
    mdp: &MarkovDecisionProcess,
    config: &SolverConfig,
) -> Result<PolicyIterationResult> {
    config.validate()?;

    let mut policy = vec![0_usize; mdp.num_states()];
    let mut value_history = Vec::new();

    for iteration in 1..=config.max_iterations {
        let values = policy_evaluation(mdp, &policy)?;
        let new_policy = greedy_policy(&mdp.bellman_backup(values.view())?);
        value_history.push(values.clone());

        let changed = policy
            .iter()
            .zip(&new_policy)
            .filter(|(old, new)| old != new)
            .count();
        debug!("policy iteration {iteration}: {changed} states changed action");

        if policies_match(&new_policy, &policy, config.tolerance) {
            info!("policy iteration converged after {iteration} evaluations");
            return Ok(PolicyIterationResult {
                policy,
                values,
                iterations: iteration,
                value_history,
            });
        }
        policy = new_policy;
    }

    warn!(
        "policy iteration still changing after {} evaluations",
        config.max_iterations
    );
    Err(Error::Convergence {
        algorithm: "policy iteration",
        iterations: config.max_iterations,
    })
}

/// `true` when every `|lhs[s] - rhs[s]| <= tolerance`.
///
/// Policies are integer valued, so any tolerance below 1 reduces this to exact
/// equality.
pub fn policies_match(lhs: &[usize], rhs: &[usize], tolerance: f64) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(&a, &b)| (a as f64 - b as f64).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::random_mdp;
    use crate::mdp::max_abs_diff;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    fn two_state_mdp(gamma: f64) -> MarkovDecisionProcess {
        let mut p = Array3::zeros((2, 2, 2));
        p[[0, 0, 0]] = 1.0;
        p[[0, 1, 1]] = 1.0;
        p[[1, 0, 1]] = 1.0;
        p[[1, 1, 1]] = 1.0;
        MarkovDecisionProcess::new(p, array![[1.0, 0.0], [0.0, 0.0]], gamma).unwrap()
    }

    #[test]
    fn test_two_state_scenario() {
        let result = policy_iteration(&two_state_mdp(0.9), &SolverConfig::default()).unwrap();
        assert_eq!(result.policy[0], 0);
        assert!(result.policy[1] < 2);
        assert_relative_eq!(result.values[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.values[1], 0.0, epsilon = 1e-9);
        // All-zeros start is already optimal: one evaluation confirms it.
        assert_eq!(result.iterations, 1);
        assert_eq!(result.value_history.len(), 1);
    }

    #[test]
    fn test_improvement_from_initial_policy() {
        // Action 1 in state 0 jumps to a rewarding absorbing state.
        let mut p = Array3::zeros((2, 2, 2));
        p[[0, 0, 0]] = 1.0;
        p[[0, 1, 1]] = 1.0;
        p[[1, 0, 1]] = 1.0;
        p[[1, 1, 1]] = 1.0;
        let mdp = MarkovDecisionProcess::new(p, array![[0.0, 0.0], [0.0, 2.0]], 0.9).unwrap();

        let result = policy_iteration(&mdp, &SolverConfig::default()).unwrap();
        assert_eq!(result.policy, vec![1, 1]);
        assert_relative_eq!(result.values[1], 20.0, epsilon = 1e-9);
        assert_relative_eq!(result.values[0], 18.0, epsilon = 1e-9);
        assert!(result.iterations > 1);
    }

    #[test]
    fn test_values_never_decrease() {
        for seed in 0..8 {
            let mdp = random_mdp(25, 4, 0.9, seed).unwrap();
            let result = policy_iteration(&mdp, &SolverConfig::default()).unwrap();
            for pair in result.value_history.windows(2) {
                for (before, after) in pair[0].iter().zip(pair[1].iter()) {
                    assert!(*after >= *before - 1e-9, "seed {seed}: {after} < {before}");
                }
            }
            assert_eq!(result.value_history.len(), result.iterations);
            assert_eq!(
                max_abs_diff(result.value_history.last().unwrap(), &result.values),
                0.0
            );
        }
    }

    #[test]
    fn test_ties_choose_lowest_action() {
        // Three identical actions everywhere.
        let p = Array3::from_elem((2, 3, 2), 0.5);
        let mdp = MarkovDecisionProcess::new(p, array![[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]], 0.5)
            .unwrap();
        let result = policy_iteration(&mdp, &SolverConfig::default()).unwrap();
        assert_eq!(result.policy, vec![0, 0]);
    }

    #[test]
    fn test_iteration_cap() {
        let mut p = Array3::zeros((2, 2, 2));
        p[[0, 0, 0]] = 1.0;
        p[[0, 1, 1]] = 1.0;
        p[[1, 0, 1]] = 1.0;
        p[[1, 1, 1]] = 1.0;
        let mdp = MarkovDecisionProcess::new(p, array![[0.0, 0.0], [0.0, 2.0]], 0.9).unwrap();
        let config = SolverConfig::default().with_max_iterations(1);

        let err = policy_iteration(&mdp, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::Convergence {
                algorithm: "policy iteration",
                iterations: 1
            }
        ));
    }

    #[test]
    fn test_singular_evaluation_propagates() {
        let err = policy_iteration(&two_state_mdp(1.0), &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Numerical { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::default().with_tolerance(-1.0);
        assert!(matches!(
            policy_iteration(&two_state_mdp(0.9), &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_policies_match() {
        assert!(policies_match(&[0, 1, 2], &[0, 1, 2], 0.0));
        assert!(!policies_match(&[0, 1, 2], &[0, 2, 2], 1e-5));
        assert!(policies_match(&[0, 1, 2], &[0, 2, 2], 1.0));
        assert!(!policies_match(&[0, 1], &[0, 1, 2], 10.0));
    }
}
