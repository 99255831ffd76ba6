//! `Safe`: for each state, the least initial resource that avoids
//! exhaustion forever under a given capacity.
//!
//! A reload state whose `MinInitCons` exceeds the capacity cannot actually
//! be relied on as a refuel point, so the computation repeatedly removes
//! such states from the reload set and reruns `MinInitCons` until the set
//! is stable. The set only shrinks, so the outer loop terminates.

use crate::error::EngineError;
use crate::min_init_cons::{action_cost, compute_min_init_cons_with, max_over_successors};
use petrel_ir::cmdp::{ActionId, Cmdp, StateId};
use petrel_ir::ExtInt;

/// `Safe(cap)` for every state: zero on surviving reload states, the
/// `MinInitCons` value where it fits the capacity, `+∞` otherwise.
pub fn compute_safe(cmdp: &Cmdp, capacity: u32) -> Result<Vec<ExtInt>, EngineError> {
    let cap = ExtInt::finite(i64::from(capacity));
    let num_states = cmdp.num_states();
    let mut reload: Vec<bool> = cmdp.reload_mask();

    let min_init_cons = loop {
        let min_init_cons = compute_min_init_cons_with(cmdp, &reload)?;
        let mut changed = false;
        for (state, slot) in reload.iter_mut().enumerate() {
            if *slot && min_init_cons[state] > cap {
                *slot = false;
                changed = true;
            }
        }
        if !changed {
            break min_init_cons;
        }
    };

    let mut safe = min_init_cons;
    for state in 0..num_states {
        if reload[state] {
            safe[state] = ExtInt::finite(0);
        } else if safe[state] > cap {
            safe[state] = ExtInt::infinity();
        }
    }
    Ok(safe)
}

/// For every state with a finite `Safe` value, the smallest-index action
/// that keeps the run safe: its cost plus the worst successor `Safe` level
/// must fit within the state's budget (the capacity on reload states, the
/// state's own `Safe` value elsewhere).
///
/// States with `Safe = +∞` have no safe action and get `None`.
pub fn safe_actions(
    cmdp: &Cmdp,
    safe: &[ExtInt],
    capacity: u32,
) -> Result<Vec<Option<ActionId>>, EngineError> {
    let cap = ExtInt::finite(i64::from(capacity));
    let mut actions: Vec<Option<ActionId>> = vec![None; cmdp.num_states()];

    for state in 0..cmdp.num_states() {
        if safe[state].is_infinite() {
            continue;
        }
        let budget = if cmdp.is_reload(state) {
            cap
        } else {
            safe[state]
        };
        actions[state] = find_action_within(cmdp, state, safe, budget)?;
    }
    Ok(actions)
}

fn find_action_within(
    cmdp: &Cmdp,
    state: StateId,
    safe: &[ExtInt],
    budget: ExtInt,
) -> Result<Option<ActionId>, EngineError> {
    for action in 0..cmdp.num_actions() {
        let step = action_cost(cmdp, state, action);
        let worst = max_over_successors(cmdp, state, action, safe);
        if step.checked_add(worst)? <= budget {
            return Ok(Some(action));
        }
    }
    Ok(None)
}
