//! `MinInitCons`: for each state, the least initial resource that
//! guarantees reaching a reload state, whatever the probabilistic outcomes.
//!
//! Computed as a greatest fixed point on `ExtInt` vectors, starting from
//! `+∞` everywhere and shrinking until stable. For a reload state the value
//! reads "resource to reach a reload state *other than staying put*": the
//! truncation to zero is applied only to successors, so a reload state's
//! own entry still reflects the work after its first action.

use crate::error::EngineError;
use petrel_ir::cmdp::{ActionId, Cmdp, StateId};
use petrel_ir::ExtInt;

/// The cost `C(s, a)` as an extended integer.
pub(crate) fn action_cost(cmdp: &Cmdp, state: StateId, action: ActionId) -> ExtInt {
    ExtInt::finite(i64::from(cmdp.cost(state, action)))
}

/// Maximum of `levels` over the successors of `(state, action)`.
///
/// The running maximum starts at `Finite(0)`, not `−∞`: every vector this
/// sees holds non-negative resource levels, and the zero base keeps an
/// (unreachable) empty successor row from producing `−∞`.
pub(crate) fn max_over_successors(
    cmdp: &Cmdp,
    state: StateId,
    action: ActionId,
    levels: &[ExtInt],
) -> ExtInt {
    let mut max = ExtInt::finite(0);
    for &(successor, _) in cmdp.successors(state, action) {
        if levels[successor] > max {
            max = levels[successor];
        }
    }
    max
}

/// Copy of `levels` with every state in `reload` forced to zero.
pub(crate) fn truncate_on_reload(levels: &[ExtInt], reload: &[bool]) -> Vec<ExtInt> {
    levels
        .iter()
        .zip(reload)
        .map(|(&level, &is_reload)| if is_reload { ExtInt::finite(0) } else { level })
        .collect()
}

/// `MinInitCons` under the model's own reload label set.
pub fn compute_min_init_cons(cmdp: &Cmdp) -> Result<Vec<ExtInt>, EngineError> {
    compute_min_init_cons_with(cmdp, &cmdp.reload_mask())
}

/// `MinInitCons` with the reload set replaced by `reload`.
///
/// Each pass reads the truncated *previous* iterate for the inner max while
/// updating the outer min in place; iteration stops on whole-vector
/// equality. Values are non-increasing and bounded below by zero, so the
/// loop terminates.
pub fn compute_min_init_cons_with(
    cmdp: &Cmdp,
    reload: &[bool],
) -> Result<Vec<ExtInt>, EngineError> {
    let num_states = cmdp.num_states();
    let mut approx = vec![ExtInt::infinity(); num_states];

    loop {
        let prev = approx.clone();
        let truncated_prev = truncate_on_reload(&prev, reload);

        for state in 0..num_states {
            // Least resource to guarantee reaching a reload state, minimised
            // over the available actions.
            let mut until_reload = ExtInt::infinity();
            for action in 0..cmdp.num_actions() {
                let step = action_cost(cmdp, state, action);
                // Resource needed *after* taking `action` (its own cost excluded).
                let remaining = max_over_successors(cmdp, state, action, &truncated_prev);
                let total = step.checked_add(remaining)?;
                if total < until_reload {
                    until_reload = total;
                }
            }
            if until_reload < approx[state] {
                approx[state] = until_reload;
            }
        }

        if approx == prev {
            return Ok(approx);
        }
    }
}
