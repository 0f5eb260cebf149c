//! Cliff Walk grid world as a tabular MDP.
//!
//! The grid is 4 rows by 12 columns. The agent starts in the bottom-left
//! corner and must reach the bottom-right corner; the cells between them on
//! the bottom row form the cliff.
//!
//! ```text
//! . . . . . . . . . . . .
//! . . . . . . . . . . . .
//! . . . . . . . . . . . .
//! S C C C C C C C C C C G
//! ```
//!
//! An action succeeds with probability `proba_succ`; otherwise one of the
//! three other directions is taken, uniformly. Bumping into a wall leaves the
//! agent in place. Each step costs 1, falling off the cliff costs 100 and
//! sends the agent back to the start, and the goal is absorbing with no
//! further reward.

use ndarray::{Array2, Array3};

use crate::error::{Error, Result};
use crate::mdp::MarkovDecisionProcess;

pub const HEIGHT: usize = 4;
pub const WIDTH: usize = 12;

pub const RIGHT: usize = 0;
pub const DOWN: usize = 1;
pub const LEFT: usize = 2;
pub const UP: usize = 3;

/// `(row, col)` displacement of each action, indexed by action.
const MOVES: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const STEP_REWARD: f64 = -1.0;
const CLIFF_REWARD: f64 = -100.0;

/// Parameters of the Cliff Walk task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliffWalk {
    proba_succ: f64,
    gamma: f64,
}

impl CliffWalk {
    pub const DEFAULT_GAMMA: f64 = 0.99;

    /// Creates the task with the given probability that an action moves in
    /// its intended direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMdp`] if `proba_succ` is outside `[0, 1]`.
    pub fn new(proba_succ: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&proba_succ) {
            return Err(Error::InvalidMdp(format!(
                "proba_succ must be between 0 and 1, got {proba_succ}"
            )));
        }
        Ok(Self {
            proba_succ,
            gamma: Self::DEFAULT_GAMMA,
        })
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn proba_succ(&self) -> f64 {
        self.proba_succ
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn num_states(&self) -> usize {
        HEIGHT * WIDTH
    }

    pub fn num_actions(&self) -> usize {
        MOVES.len()
    }

    pub fn start(&self) -> usize {
        state_index(HEIGHT - 1, 0)
    }

    pub fn goal(&self) -> usize {
        state_index(HEIGHT - 1, WIDTH - 1)
    }

    pub fn is_cliff(&self, state: usize) -> bool {
        let (row, col) = coordinates(state);
        row == HEIGHT - 1 && col > 0 && col < WIDTH - 1
    }

    /// Builds the transition tensor and expected-reward table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMdp`] if the discount factor is outside `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdp_planning::env::CliffWalk;
    ///
    /// let env = CliffWalk::new(0.6).unwrap();
    /// let mdp = env.mdp().unwrap();
    ///
    /// assert_eq!(mdp.num_states(), 48);
    /// assert_eq!(mdp.num_actions(), 4);
    /// assert_eq!(mdp.transitions()[[env.goal(), 0, env.goal()]], 1.0);
    /// ```
    pub fn mdp(&self) -> Result<MarkovDecisionProcess> {
        let ns = self.num_states();
        let na = self.num_actions();
        let mut transitions = Array3::<f64>::zeros((ns, na, ns));
        let mut rewards = Array2::<f64>::zeros((ns, na));
        let slip = (1.0 - self.proba_succ) / (na - 1) as f64;

        for s in 0..ns {
            if s == self.goal() {
                for a in 0..na {
                    transitions[[s, a, s]] = 1.0;
                }
                continue;
            }
            if self.is_cliff(s) {
                // Never entered: falling in teleports to the start.
                for a in 0..na {
                    transitions[[s, a, self.start()]] = 1.0;
                }
                continue;
            }

            for a in 0..na {
                let mut p_fall = 0.0;
                for direction in 0..na {
                    let prob = if direction == a { self.proba_succ } else { slip };
                    if prob == 0.0 {
                        continue;
                    }
                    let target = step(s, direction);
                    if self.is_cliff(target) {
                        transitions[[s, a, self.start()]] += prob;
                        p_fall += prob;
                    } else {
                        transitions[[s, a, target]] += prob;
                    }
                }
                // Actions with identical outcome distributions get bit-identical rewards.
                rewards[[s, a]] = STEP_REWARD + (CLIFF_REWARD - STEP_REWARD) * p_fall;
            }
        }

        MarkovDecisionProcess::new(transitions, rewards, self.gamma)
    }
}

pub fn state_index(row: usize, col: usize) -> usize {
    row * WIDTH + col
}

pub fn coordinates(state: usize) -> (usize, usize) {
    (state / WIDTH, state % WIDTH)
}

/// Cell reached from `state` by moving in `direction`, staying put at walls.
fn step(state: usize, direction: usize) -> usize {
    let (row, col) = coordinates(state);
    let (dr, dc) = MOVES[direction];
    match (row.checked_add_signed(dr), col.checked_add_signed(dc)) {
        (Some(r), Some(c)) if r < HEIGHT && c < WIDTH => state_index(r, c),
        _ => state,
    }
}
