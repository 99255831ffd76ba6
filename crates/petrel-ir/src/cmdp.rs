use indexmap::IndexSet;
use std::fmt;
use thiserror::Error;

/// A state of the consumption MDP, `0 ≤ s < num_states`.
pub type StateId = usize;
/// An action index, `0 ≤ a < num_actions`; uniform across states.
pub type ActionId = usize;

/// Structural defects caught while assembling a [`Cmdp`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("state {state} action {action} has an empty successor distribution")]
    EmptyDistribution { state: StateId, action: ActionId },
    #[error("state {state} action {action}: probability {probability} is not positive")]
    NonPositiveProbability {
        state: StateId,
        action: ActionId,
        probability: f64,
    },
    #[error("state {state} action {action}: probabilities sum to {sum}, expected 1")]
    ProbabilityMass {
        state: StateId,
        action: ActionId,
        sum: f64,
    },
    #[error("state {state} action {action}: duplicate successor {successor}")]
    DuplicateSuccessor {
        state: StateId,
        action: ActionId,
        successor: StateId,
    },
    #[error("successor state {successor} out of range (model has {num_states} states)")]
    SuccessorOutOfRange {
        successor: StateId,
        num_states: usize,
    },
}

/// Tolerance when checking that a distribution sums to one.
const PROBABILITY_MASS_EPS: f64 = 1e-9;

/// A consumption MDP in explicit sparse form.
///
/// Choices are indexed row-major by `s * num_actions + a`; every state has
/// the same number of actions (uniform arity is enforced upstream during
/// lowering). Each choice carries a non-negative integer cost and a
/// finite-support probability distribution over successor states. The
/// `reload` and `target` label sets are [`IndexSet`]s, so iterating them
/// follows label-declaration order deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct Cmdp {
    num_states: usize,
    num_actions: usize,
    rows: Vec<Vec<(StateId, f64)>>,
    costs: Vec<u32>,
    reload: IndexSet<StateId>,
    target: IndexSet<StateId>,
}

impl Cmdp {
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// The cost `C(s, a)`.
    pub fn cost(&self, state: StateId, action: ActionId) -> u32 {
        self.costs[self.choice_index(state, action)]
    }

    /// The successor distribution of `(s, a)`: pairs `(t, p)` with `p > 0`.
    pub fn successors(&self, state: StateId, action: ActionId) -> &[(StateId, f64)] {
        &self.rows[self.choice_index(state, action)]
    }

    pub fn is_reload(&self, state: StateId) -> bool {
        self.reload.contains(&state)
    }

    pub fn is_target(&self, state: StateId) -> bool {
        self.target.contains(&state)
    }

    /// Membership mask of the reload label, indexed by state. The engines
    /// mutate a copy of this as their shrinking working set.
    pub fn reload_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.num_states];
        for &state in &self.reload {
            mask[state] = true;
        }
        mask
    }

    /// Reload states in label-declaration order.
    pub fn reload_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.reload.iter().copied()
    }

    /// Target states in label-declaration order.
    pub fn target_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.target.iter().copied()
    }

    fn choice_index(&self, state: StateId, action: ActionId) -> usize {
        debug_assert!(state < self.num_states && action < self.num_actions);
        state * self.num_actions + action
    }
}

impl fmt::Display for Cmdp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Consumption MDP: {} states, {} actions per state",
            self.num_states, self.num_actions
        )?;
        writeln!(
            f,
            "  reload: {{{}}}",
            join_states(self.reload_states())
        )?;
        writeln!(
            f,
            "  target: {{{}}}",
            join_states(self.target_states())
        )?;
        for s in 0..self.num_states {
            for a in 0..self.num_actions {
                write!(f, "  s{s} --a{a} (cost {})-->", self.cost(s, a))?;
                for &(t, p) in self.successors(s, a) {
                    write!(f, " {p}:s{t}")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn join_states(states: impl Iterator<Item = StateId>) -> String {
    states
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Incremental builder for [`Cmdp`].
#[derive(Debug, Clone)]
pub struct CmdpBuilder {
    num_states: usize,
    num_actions: usize,
    rows: Vec<Vec<(StateId, f64)>>,
    costs: Vec<u32>,
    reload: IndexSet<StateId>,
    target: IndexSet<StateId>,
}

impl CmdpBuilder {
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        let choices = num_states * num_actions;
        Self {
            num_states,
            num_actions,
            rows: vec![Vec::new(); choices],
            costs: vec![0; choices],
            reload: IndexSet::new(),
            target: IndexSet::new(),
        }
    }

    pub fn set_cost(&mut self, state: StateId, action: ActionId, cost: u32) -> &mut Self {
        let idx = state * self.num_actions + action;
        self.costs[idx] = cost;
        self
    }

    pub fn add_successor(
        &mut self,
        state: StateId,
        action: ActionId,
        successor: StateId,
        probability: f64,
    ) -> &mut Self {
        let idx = state * self.num_actions + action;
        self.rows[idx].push((successor, probability));
        self
    }

    pub fn mark_reload(&mut self, state: StateId) -> &mut Self {
        self.reload.insert(state);
        self
    }

    pub fn mark_target(&mut self, state: StateId) -> &mut Self {
        self.target.insert(state);
        self
    }

    /// Validate distributions and freeze the model.
    pub fn build(self) -> Result<Cmdp, ModelError> {
        for state in 0..self.num_states {
            for action in 0..self.num_actions {
                let row = &self.rows[state * self.num_actions + action];
                if row.is_empty() {
                    return Err(ModelError::EmptyDistribution { state, action });
                }
                let mut seen = vec![false; self.num_states];
                let mut sum = 0.0;
                for &(successor, probability) in row {
                    if successor >= self.num_states {
                        return Err(ModelError::SuccessorOutOfRange {
                            successor,
                            num_states: self.num_states,
                        });
                    }
                    if probability <= 0.0 {
                        return Err(ModelError::NonPositiveProbability {
                            state,
                            action,
                            probability,
                        });
                    }
                    if seen[successor] {
                        return Err(ModelError::DuplicateSuccessor {
                            state,
                            action,
                            successor,
                        });
                    }
                    seen[successor] = true;
                    sum += probability;
                }
                if (sum - 1.0).abs() > PROBABILITY_MASS_EPS {
                    return Err(ModelError::ProbabilityMass { state, action, sum });
                }
            }
        }
        Ok(Cmdp {
            num_states: self.num_states,
            num_actions: self.num_actions,
            rows: self.rows,
            costs: self.costs,
            reload: self.reload,
            target: self.target,
        })
    }
}
