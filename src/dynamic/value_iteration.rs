//! Value iteration on the Q-function.
//!
//! Starting from `Q = 0`, every sweep applies the Bellman optimality backup
//! `Q_new[s, a] = R[s, a] + gamma * sum_s' P[s, a, s'] * max_a' Q[s', a']` and
//! stops once the induced value functions of two consecutive sweeps differ by
//! less than the tolerance in the infinity norm. Every intermediate
//! Q-function is kept so convergence curves can be drawn afterwards.

use log::{debug, info, warn};
use ndarray::{Array1, Array2};

use crate::dynamic::SolverConfig;
use crate::error::{Error, Result};
use crate::mdp::{greedy_policy, max_abs_diff, max_over_actions, MarkovDecisionProcess};

/// Outcome of [`value_iteration`].
#[derive(Debug, Clone)]
pub struct ValueIterationResult {
    /// Last Q-function adopted by the loop (the final entry of `q_history`).
    pub q: Array2<f64>,
    /// Greedy policy of the terminal backup, lowest action index on ties.
    pub policy: Vec<usize>,
    /// Every Q-function in iteration order, starting with the all-zeros table.
    pub q_history: Vec<Array2<f64>>,
    /// Number of Bellman backups performed, including the terminal one.
    pub iterations: usize,
}

impl ValueIterationResult {
    /// `V[s] = max_a q[s, a]`.
    pub fn values(&self) -> Array1<f64> {
        max_over_actions(&self.q)
    }

    /// Euclidean distance between the value function induced by each entry of
    /// `q_history` and `reference`, typically the exact value of the optimal
    /// policy. This is the data of a value-iteration convergence curve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMdp`] if `reference` does not hold one value per
    /// state.
    pub fn convergence_errors(&self, reference: &Array1<f64>) -> Result<Vec<f64>> {
        if reference.len() != self.q.nrows() {
            return Err(Error::InvalidMdp(format!(
                "reference value function has {} entries, expected {}",
                reference.len(),
                self.q.nrows()
            )));
        }
        Ok(self
            .q_history
            .iter()
            .map(|q| {
                let diff = max_over_actions(q) - reference;
                diff.dot(&diff).sqrt()
            })
            .collect())
    }
}

/// Runs value iteration on `mdp`.
///
/// # Errors
///
/// - [`Error::Convergence`] if `config.max_iterations` backups pass without
///   the value function settling below `config.tolerance`.
/// - [`Error::InvalidConfig`] for a negative or non-finite tolerance or a zero
///   iteration cap.
///
/// # Examples
///
/// ```
/// use mdp_planning::{value_iteration, MarkovDecisionProcess, SolverConfig};
/// use ndarray::{array, Array3};
///
/// let mut p = Array3::zeros((2, 2, 2));
/// p[[0, 0, 0]] = 1.0;
/// p[[0, 1, 1]] = 1.0;
/// p[[1, 0, 1]] = 1.0;
/// p[[1, 1, 1]] = 1.0;
/// let mdp = MarkovDecisionProcess::new(p, array![[1.0, 0.0], [0.0, 0.0]], 0.9).unwrap();
///
/// let config = SolverConfig::default().with_tolerance(1e-6);
/// let result = value_iteration(&mdp, &config).unwrap();
///
/// assert_eq!(result.policy, vec![0, 0]);
/// assert!((result.values()[0] - 10.0).abs() < 1e-4);
/// assert_eq!(result.q_history.len(), result.iterations);
/// ```
pub fn value_iteration(
    mdp: &MarkovDecisionProcess,
    config: &SolverConfig,
) -> Result<ValueIterationResult> {
    config.validate()?;

    let mut q = Array2::<f64>::zeros((mdp.num_states(), mdp.num_actions()));
    let mut q_history = vec![q.clone()];

    for iteration in 1..=config.max_iterations {
        let v = max_over_actions(&q);
        let q_new = mdp.bellman_backup(v.view())?;
        let v_new = max_over_actions(&q_new);

        let delta = max_abs_diff(&v_new, &v);
        debug!("value iteration {iteration}: delta = {delta:e}");

        if delta < config.tolerance {
            info!("value iteration converged after {iteration} backups (delta = {delta:e})");
            let policy = greedy_policy(&q_new);
            return Ok(ValueIterationResult {
                q,
                policy,
                q_history,
                iterations: iteration,
            });
        }

        q_history.push(q_new.clone());
        q = q_new;
    }

    warn!(
        "value iteration did not settle below {:e} after {} backups",
        config.tolerance, config.max_iterations
    );
    Err(Error::Convergence {
        algorithm: "value iteration",
        iterations: config.max_iterations,
    })
}
