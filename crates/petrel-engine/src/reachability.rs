//! Qualitative reachability on the product chain.
//!
//! The counter selector leaves no choices open, so "reached with positive
//! probability" collapses to plain graph reachability over the
//! positive-probability edges. The validator needs both directions of the
//! classic `prob01` split: states that *can* reach a goal set (positive
//! probability) and, by complement, states that reach it with probability
//! exactly zero. One backward sweep over reversed transitions answers
//! both.

use crate::product::ProductChain;

/// Mask of product states that reach some state in `goal` with positive
/// probability. Goal states trivially reach themselves.
pub fn can_reach(product: &ProductChain, goal: &[bool]) -> Vec<bool> {
    let n = product.num_states();
    debug_assert_eq!(goal.len(), n);

    // Reverse adjacency over positive-probability edges.
    let mut reversed: Vec<Vec<usize>> = vec![Vec::new(); n];
    for q in 0..n {
        for &(succ, probability) in product.successors(q) {
            if probability > 0.0 {
                reversed[succ].push(q);
            }
        }
    }

    let mut reachable = goal.to_vec();
    let mut worklist: Vec<usize> = (0..n).filter(|&q| goal[q]).collect();
    while let Some(q) = worklist.pop() {
        for &pred in &reversed[q] {
            if !reachable[pred] {
                reachable[pred] = true;
                worklist.push(pred);
            }
        }
    }
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use petrel_ir::{CmdpBuilder, CounterSelector};

    fn chain_product() -> ProductChain {
        // 0 → 1 → 0 cycle with a reload at 0, capacity 2.
        let mut b = CmdpBuilder::new(2, 1);
        b.set_cost(0, 0, 1).add_successor(0, 0, 1, 1.0);
        b.set_cost(1, 0, 1).add_successor(1, 0, 0, 1.0);
        b.mark_reload(0).mark_target(1);
        let cmdp = b.build().unwrap();
        ProductChain::build(&cmdp, &CounterSelector::undefined(2, 2))
    }

    #[test]
    fn goal_states_reach_themselves() {
        let product = chain_product();
        let reach = can_reach(&product, product.target_mask());
        for level in 0..=2 {
            assert!(reach[product.index(1, level)]);
        }
    }

    #[test]
    fn predecessors_of_goal_are_reachable() {
        let product = chain_product();
        let reach = can_reach(&product, product.target_mask());
        // Every (0, level) steps to (1, 1), which is a target.
        for level in 0..=2 {
            assert!(reach[product.index(0, level)]);
        }
    }

    #[test]
    fn drained_reaches_no_target() {
        let product = chain_product();
        let reach = can_reach(&product, product.target_mask());
        assert!(!reach[product.drained()]);
    }

    #[test]
    fn drain_reachability_flags_underfunded_states() {
        let product = chain_product();
        let mut drain_goal = vec![false; product.num_states()];
        drain_goal[product.drained()] = true;
        let reach = can_reach(&product, &drain_goal);
        // (1, 0) underflows straight into the drained state.
        assert!(reach[product.index(1, 0)]);
        // (1, 1) steps to the reload and survives forever.
        assert!(!reach[product.index(1, 1)]);
        assert!(!reach[product.index(0, 0)]);
    }
}
