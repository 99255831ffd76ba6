//! `SafePR`: for each state, the least initial resource that both avoids
//! exhaustion forever and reaches a target state with positive
//! probability, together with the counter selector realising it.
//!
//! The policy commits, per state and action, to one distinguished
//! successor from which it will keep progressing toward the target; every
//! other successor only has to stay safe. `spr_val` scores an action as
//! the cheapest such commitment; the fixed point iterates the pointwise
//! minimum over actions with a two-sided truncation (values above the
//! capacity are hopeless, reload states refill to zero). Values only ever
//! shrink on a finite domain, so the loop terminates.

use crate::error::EngineError;
use crate::min_init_cons::action_cost;
use crate::safe::{compute_safe, safe_actions};
use petrel_ir::cmdp::{ActionId, Cmdp, StateId};
use petrel_ir::{CounterSelector, ExtInt};

/// Output of the `SafePR` computation.
#[derive(Debug, Clone)]
pub struct SafePrOutcome {
    /// `Safe` vector (needed again by the validator and the report).
    pub safe: Vec<ExtInt>,
    /// `SafePR` vector.
    pub values: Vec<ExtInt>,
    /// Counter selector witnessing the `SafePR` values.
    pub selector: CounterSelector,
}

/// Worst-case resource needed after firing `(state, action)` when the
/// current progress estimate is `progress`: commit to the cheapest
/// successor, require the rest to be merely safe.
///
/// With a single successor there are no "others" to bound, and that
/// successor's progress level stands alone.
fn spr_val(
    cmdp: &Cmdp,
    state: StateId,
    action: ActionId,
    progress: &[ExtInt],
    safe: &[ExtInt],
) -> Result<ExtInt, EngineError> {
    let successors = cmdp.successors(state, action);
    let mut cheapest_commitment = ExtInt::infinity();
    for (pick, &(committed, _)) in successors.iter().enumerate() {
        let mut level = progress[committed];
        for (other, &(bystander, _)) in successors.iter().enumerate() {
            if other != pick && safe[bystander] > level {
                level = safe[bystander];
            }
        }
        if level < cheapest_commitment {
            cheapest_commitment = level;
        }
    }
    Ok(action_cost(cmdp, state, action).checked_add(cheapest_commitment)?)
}

/// The action minimising `spr_val` at `state`, seeded from action 0; ties
/// keep the smallest action index.
fn best_action(
    cmdp: &Cmdp,
    state: StateId,
    progress: &[ExtInt],
    safe: &[ExtInt],
) -> Result<(ActionId, ExtInt), EngineError> {
    let mut best = 0;
    let mut best_val = spr_val(cmdp, state, 0, progress, safe)?;
    for action in 1..cmdp.num_actions() {
        let val = spr_val(cmdp, state, action, progress, safe)?;
        if val < best_val {
            best_val = val;
            best = action;
        }
    }
    Ok((best, best_val))
}

/// Compute `SafePR` and its counter selector.
pub fn compute_safe_pr(cmdp: &Cmdp, capacity: u32) -> Result<SafePrOutcome, EngineError> {
    let num_states = cmdp.num_states();
    let cap = ExtInt::finite(i64::from(capacity));

    let safe = compute_safe(cmdp, capacity)?;
    let safe_action = safe_actions(cmdp, &safe, capacity)?;

    // Seed the selector: wherever survival is possible at all, the safe
    // action is the obligation at exactly the `Safe` level.
    let mut selector = CounterSelector::undefined(num_states, capacity);
    for state in 0..num_states {
        if let (ExtInt::Finite(level), Some(action)) = (safe[state], safe_action[state]) {
            selector.set(state, level as u32, action);
        }
    }

    // Targets start at their Safe value and never move; everything else
    // starts hopeless and improves monotonically.
    let mut progress: Vec<ExtInt> = (0..num_states)
        .map(|state| {
            if cmdp.is_target(state) {
                safe[state]
            } else {
                ExtInt::infinity()
            }
        })
        .collect();

    loop {
        let prev = progress.clone();
        let mut next = prev.clone();
        let mut chosen: Vec<Option<ActionId>> = vec![None; num_states];

        for state in 0..num_states {
            if cmdp.is_target(state) {
                continue;
            }
            let (action, value) = best_action(cmdp, state, &prev, &safe)?;
            next[state] = value;
            chosen[state] = Some(action);
        }

        // Two-sided truncation. The order matters: a reload state whose
        // value exceeds the capacity must become +∞, not zero.
        for (state, value) in next.iter_mut().enumerate() {
            if *value > cap {
                *value = ExtInt::infinity();
            } else if cmdp.is_reload(state) {
                *value = ExtInt::finite(0);
            }
        }

        // Record every strict improvement at its (tightest) new level.
        for state in 0..num_states {
            if cmdp.is_target(state) || next[state] >= prev[state] {
                continue;
            }
            if let (ExtInt::Finite(level), Some(action)) = (next[state], chosen[state]) {
                selector.set(state, level as u32, action);
            }
        }

        if next == prev {
            return Ok(SafePrOutcome {
                safe,
                values: next,
                selector,
            });
        }
        progress = next;
    }
}
