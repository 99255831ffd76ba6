//! Semantic validation of a computed counter selector.
//!
//! For every state whose `SafePR` value fits the capacity, starting the
//! product chain at `(state, SafePR(state))` and following the selector
//! must (a) reach a target state with positive probability and (b) reach
//! the drained state with probability exactly zero. A single boolean
//! verdict covers all such states.

use crate::error::EngineError;
use crate::product::ProductChain;
use crate::reachability::can_reach;
use petrel_ir::ExtInt;

/// Check the counter-selector contract on an already-built product chain.
///
/// `safe_pr` is indexed by model state; `capacity` is the product's
/// capacity. Returns `Ok(false)` as soon as one anchor state violates
/// either guarantee.
pub fn validate_counter_selector(
    product: &ProductChain,
    safe_pr: &[ExtInt],
    capacity: u32,
) -> Result<bool, EngineError> {
    let cap = ExtInt::finite(i64::from(capacity));

    let reaches_target = can_reach(product, product.target_mask());
    let mut drain_goal = vec![false; product.num_states()];
    drain_goal[product.drained()] = true;
    let reaches_drain = can_reach(product, &drain_goal);

    for (state, &value) in safe_pr.iter().enumerate() {
        if value > cap {
            continue;
        }
        let level = value.finite_value()? as u32;
        let anchor = product.index(state, level);
        if !reaches_target[anchor] {
            tracing::debug!(state, level, "selector cannot reach the target");
            return Ok(false);
        }
        if reaches_drain[anchor] {
            tracing::debug!(state, level, "selector risks draining the resource");
            return Ok(false);
        }
    }
    Ok(true)
}
