//! Tabular Markov Decision Process representation shared by the dynamic
//! programming solvers.
//!
//! The model is stored as dense arrays: a transition tensor `P` of shape
//! `(Ns, Na, Ns)` and an expected-reward table `R` of shape `(Ns, Na)`.

use ndarray::{s, Array1, Array2, Array3, ArrayView1, Axis};

use crate::error::{Error, Result};

/// Allowed deviation of a transition row's sum from 1.0.
pub const PROBABILITY_EPSILON: f64 = 1e-8;

/// A finite MDP in dense form.
#[derive(Debug, Clone)]
pub struct MarkovDecisionProcess {
    /// `transitions[[s, a, s_next]]` is the probability of landing in `s_next`
    /// after taking action `a` in state `s`.
    transitions: Array3<f64>,
    /// `rewards[[s, a]]` is the expected immediate reward of `(s, a)`.
    rewards: Array2<f64>,
    /// Discount factor (0 <= gamma <= 1)
    gamma: f64,
}

impl MarkovDecisionProcess {
    /// Creates a validated MDP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMdp`] if the shapes of `transitions` and
    /// `rewards` disagree, if either contains a non-finite value, if a
    /// probability lies outside `[0, 1]`, if any row `P[s, a, :]` does not sum
    /// to 1.0 (within [`PROBABILITY_EPSILON`]), or if `gamma` is outside
    /// `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdp_planning::MarkovDecisionProcess;
    /// use ndarray::{array, Array3};
    ///
    /// // One state, one action that loops back with reward 1.
    /// let p = Array3::from_elem((1, 1, 1), 1.0);
    /// let r = array![[1.0]];
    /// let mdp = MarkovDecisionProcess::new(p, r, 0.5).unwrap();
    ///
    /// assert_eq!(mdp.num_states(), 1);
    /// assert_eq!(mdp.num_actions(), 1);
    /// ```
    pub fn new(transitions: Array3<f64>, rewards: Array2<f64>, gamma: f64) -> Result<Self> {
        let (num_states, num_actions, num_next) = transitions.dim();
        if num_states == 0 || num_actions == 0 {
            return Err(Error::InvalidMdp(format!(
                "need at least one state and one action, got {num_states} states and {num_actions} actions"
            )));
        }
        if num_next != num_states {
            return Err(Error::InvalidMdp(format!(
                "transition tensor must be (Ns, Na, Ns), got ({num_states}, {num_actions}, {num_next})"
            )));
        }
        if rewards.dim() != (num_states, num_actions) {
            return Err(Error::InvalidMdp(format!(
                "reward table must be ({num_states}, {num_actions}), got {:?}",
                rewards.dim()
            )));
        }
        if !(0.0..=1.0).contains(&gamma) {
            return Err(Error::InvalidMdp(format!(
                "discount factor gamma must be between 0 and 1, got {gamma}"
            )));
        }
        if let Some(((s, a), r)) = rewards.indexed_iter().find(|(_, r)| !r.is_finite()) {
            return Err(Error::InvalidMdp(format!(
                "reward for state {s}, action {a} is not finite: {r}"
            )));
        }

        for s in 0..num_states {
            for a in 0..num_actions {
                let row = transitions.slice(s![s, a, ..]);
                if let Some(p) = row.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                    return Err(Error::InvalidMdp(format!(
                        "transition probability {p} in state {s}, action {a} is outside [0, 1]"
                    )));
                }
                let prob_sum = row.sum();
                if (prob_sum - 1.0).abs() > PROBABILITY_EPSILON {
                    return Err(Error::InvalidMdp(format!(
                        "probabilities in state {s}, action {a} must sum to 1.0, but got {prob_sum}"
                    )));
                }
            }
        }

        Ok(Self {
            transitions: transitions.as_standard_layout().into_owned(),
            rewards,
            gamma,
        })
    }

    pub fn num_states(&self) -> usize {
        self.rewards.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.rewards.ncols()
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn transitions(&self) -> &Array3<f64> {
        &self.transitions
    }

    pub fn rewards(&self) -> &Array2<f64> {
        &self.rewards
    }

    /// One-step lookahead for every state-action pair:
    /// `Q[s, a] = R[s, a] + gamma * sum_s' P[s, a, s'] * V[s']`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMdp`] if `values` does not hold one entry per
    /// state.
    pub fn bellman_backup(&self, values: ArrayView1<f64>) -> Result<Array2<f64>> {
        let (ns, na) = (self.num_states(), self.num_actions());
        if values.len() != ns {
            return Err(Error::InvalidMdp(format!(
                "value function has {} entries, expected {ns}",
                values.len()
            )));
        }
        let flat = self.transitions.view().into_shape_with_order((ns * na, ns))?;
        let expected = flat.dot(&values).into_shape_with_order((ns, na))?;
        Ok(&self.rewards + &(expected * self.gamma))
    }

    /// Checks that `policy` assigns a valid action to every state.
    pub fn check_policy(&self, policy: &[usize]) -> Result<()> {
        if policy.len() != self.num_states() {
            return Err(Error::InvalidPolicy(format!(
                "policy covers {} states, expected {}",
                policy.len(),
                self.num_states()
            )));
        }
        if let Some((s, a)) = policy
            .iter()
            .enumerate()
            .find(|&(_, &a)| a >= self.num_actions())
        {
            return Err(Error::InvalidPolicy(format!(
                "action {a} in state {s} is out of range (num_actions = {})",
                self.num_actions()
            )));
        }
        Ok(())
    }
}

/// `V[s] = max_a Q[s, a]`.
pub fn max_over_actions(q: &Array2<f64>) -> Array1<f64> {
    q.map_axis(Axis(1), |row| row.fold(f64::NEG_INFINITY, |m, &x| m.max(x)))
}

/// Greedy policy with respect to `q`: for each state the first action
/// achieving the row maximum.
pub fn greedy_policy(q: &Array2<f64>) -> Vec<usize> {
    q.outer_iter().map(argmax).collect()
}

/// Index of the largest entry, lowest index on ties.
pub fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best_a = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (a, &val) in row.iter().enumerate() {
        if val > best_val {
            best_val = val;
            best_a = a;
        }
    }
    best_a
}

/// Largest absolute elementwise difference between two value functions.
pub fn max_abs_diff(lhs: &Array1<f64>, rhs: &Array1<f64>) -> f64 {
    (lhs - rhs).fold(0.0_f64, |m, &d| m.max(d.abs()))
}
