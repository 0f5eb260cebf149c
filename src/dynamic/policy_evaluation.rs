//! Exact evaluation of a fixed deterministic policy.
//!
//! For a fixed policy the Bellman expectation equation
//! `V = R_pi + gamma * P_pi * V` is linear in `V`, so the value function is
//! obtained with one direct solve of `(I - gamma * P_pi) V = R_pi`.

use log::trace;
use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::math::solve;
use crate::mdp::{max_abs_diff, MarkovDecisionProcess};

/// Returns the value function of `policy` on `mdp`.
///
/// # Errors
///
/// - [`Error::InvalidPolicy`](crate::Error::InvalidPolicy) if `policy` does not
///   assign an in-range action to every state.
/// - [`Error::Numerical`](crate::Error::Numerical) if `I - gamma * P_pi` is
///   singular, which happens for `gamma = 1` whenever the policy reaches an
///   absorbing state.
///
/// # Examples
///
/// ```
/// use mdp_planning::{policy_evaluation, MarkovDecisionProcess};
/// use ndarray::{array, Array3};
///
/// // A single state that loops on itself with reward 1: V = 1 / (1 - gamma).
/// let mdp = MarkovDecisionProcess::new(Array3::from_elem((1, 1, 1), 1.0), array![[1.0]], 0.9)
///     .unwrap();
/// let v = policy_evaluation(&mdp, &[0]).unwrap();
///
/// assert!((v[0] - 10.0).abs() < 1e-9);
/// ```
pub fn policy_evaluation(mdp: &MarkovDecisionProcess, policy: &[usize]) -> Result<Array1<f64>> {
    mdp.check_policy(policy)?;
    let (p_pi, r_pi) = induced_chain(mdp, policy);

    let ns = mdp.num_states();
    let system = Array2::<f64>::eye(ns) - &(p_pi * mdp.gamma());
    let values = solve(system, r_pi)?;
    trace!("evaluated policy {:?}: {}", policy, values);
    Ok(values)
}

/// Infinity norm of `V - (R_pi + gamma * P_pi * V)`.
///
/// Zero (up to rounding) exactly when `values` is the value function of
/// `policy`.
pub fn policy_evaluation_residual(
    mdp: &MarkovDecisionProcess,
    policy: &[usize],
    values: &Array1<f64>,
) -> Result<f64> {
    mdp.check_policy(policy)?;
    let (p_pi, r_pi) = induced_chain(mdp, policy);
    let backup = r_pi + &(p_pi.dot(values) * mdp.gamma());
    Ok(max_abs_diff(values, &backup))
}

/// `P_pi[s, :] = P[s, policy[s], :]` and `R_pi[s] = R[s, policy[s]]`.
fn induced_chain(mdp: &MarkovDecisionProcess, policy: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let ns = mdp.num_states();
    let p = mdp.transitions();
    let r = mdp.rewards();
    let p_pi = Array2::from_shape_fn((ns, ns), |(s, s_next)| p[[s, policy[s], s_next]]);
    let r_pi = Array1::from_shape_fn(ns, |s| r[[s, policy[s]]]);
    (p_pi, r_pi)
}
