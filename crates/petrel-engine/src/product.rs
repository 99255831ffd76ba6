//! Deterministic product of a consumption MDP with its resource counter.
//!
//! Once a counter selector fixes the choice at every `(state, level)`
//! pair, the product `CMDP × {0,…,cap}` is a Markov chain on
//! `N·(cap+1) + 1` states: pairs are packed densely as
//! `state·(cap+1) + level`, with one extra absorbing state for runs that
//! drain the resource below zero.

use petrel_ir::cmdp::{Cmdp, StateId};
use petrel_ir::CounterSelector;

/// Markov chain induced by a counter selector.
#[derive(Debug, Clone)]
pub struct ProductChain {
    rows: Vec<Vec<(usize, f64)>>,
    target: Vec<bool>,
    num_model_states: usize,
    capacity: u32,
}

impl ProductChain {
    /// Materialise the product of `cmdp` and `selector`.
    pub fn build(cmdp: &Cmdp, selector: &CounterSelector) -> Self {
        let capacity = selector.capacity();
        let levels = capacity as usize + 1;
        let num_model_states = cmdp.num_states();
        let drained = num_model_states * levels;
        let mut rows: Vec<Vec<(usize, f64)>> = Vec::with_capacity(drained + 1);
        let mut target = vec![false; drained + 1];

        for state in 0..num_model_states {
            for level in 0..levels as u32 {
                let action = selector.lookup(state, level);
                let cost = i64::from(cmdp.cost(state, action));
                let before = if cmdp.is_reload(state) {
                    i64::from(capacity)
                } else {
                    i64::from(level)
                };
                let after = before - cost;
                let row = if after < 0 {
                    vec![(drained, 1.0)]
                } else {
                    cmdp.successors(state, action)
                        .iter()
                        .map(|&(succ, p)| (succ * levels + after as usize, p))
                        .collect()
                };
                rows.push(row);
                target[state * levels + level as usize] = cmdp.is_target(state);
            }
        }
        rows.push(vec![(drained, 1.0)]);

        Self {
            rows,
            target,
            num_model_states,
            capacity,
        }
    }

    /// Packed index of the pair `(state, level)`.
    pub fn index(&self, state: StateId, level: u32) -> usize {
        debug_assert!(state < self.num_model_states && level <= self.capacity);
        state * (self.capacity as usize + 1) + level as usize
    }

    /// Index of the absorbing drained state.
    pub fn drained(&self) -> usize {
        self.rows.len() - 1
    }

    /// Total number of product states, `N·(cap+1) + 1`.
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn successors(&self, product_state: usize) -> &[(usize, f64)] {
        &self.rows[product_state]
    }

    pub fn is_target(&self, product_state: usize) -> bool {
        self.target[product_state]
    }

    /// Membership mask of the target label over product states.
    pub fn target_mask(&self) -> &[bool] {
        &self.target
    }
}
