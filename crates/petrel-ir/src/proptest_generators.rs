//! Proptest strategies for generating well-formed [`Cmdp`] instances.

use proptest::prelude::*;

use crate::cmdp::{Cmdp, CmdpBuilder};

/// Strategy for a well-formed consumption MDP suitable for property
/// testing.
///
/// Generated models have:
/// - 2–8 states, 1–3 actions per state (uniform arity by construction)
/// - per-choice costs in 0–4
/// - distributions with 1–3 distinct successors whose weights sum to 1
/// - at least one reload state; target states chosen freely (possibly none)
pub fn arb_cmdp() -> impl Strategy<Value = Cmdp> {
    (2..=8usize, 1..=3usize)
        .prop_flat_map(|(num_states, num_actions)| {
            let choices = num_states * num_actions;
            let costs = proptest::collection::vec(0u32..=4, choices..=choices);
            // For each choice: a successor-count seed and a shuffled pick of
            // successors; weights are derived deterministically below.
            let rows = proptest::collection::vec(
                (1..=3usize, proptest::collection::vec(0..num_states, 3)),
                choices..=choices,
            );
            let reload = proptest::collection::vec(any::<bool>(), num_states..=num_states);
            let target = proptest::collection::vec(any::<bool>(), num_states..=num_states);
            (
                Just(num_states),
                Just(num_actions),
                costs,
                rows,
                reload,
                target,
            )
        })
        .prop_map(
            |(num_states, num_actions, costs, rows, mut reload, target)| {
                // Guarantee at least one reload state so Safe is not
                // degenerate on every instance.
                if !reload.iter().any(|&r| r) {
                    reload[0] = true;
                }
                let mut builder = CmdpBuilder::new(num_states, num_actions);
                for state in 0..num_states {
                    for action in 0..num_actions {
                        let idx = state * num_actions + action;
                        builder.set_cost(state, action, costs[idx]);
                        let (want, picks) = &rows[idx];
                        let mut successors: Vec<usize> = Vec::new();
                        for &p in picks {
                            if successors.len() < *want && !successors.contains(&p) {
                                successors.push(p);
                            }
                        }
                        if successors.is_empty() {
                            successors.push(picks[0]);
                        }
                        let weight = 1.0 / successors.len() as f64;
                        for &succ in &successors {
                            builder.add_successor(state, action, succ, weight);
                        }
                    }
                }
                for (state, &is_reload) in reload.iter().enumerate() {
                    if is_reload {
                        builder.mark_reload(state);
                    }
                }
                for (state, &is_target) in target.iter().enumerate() {
                    if is_target {
                        builder.mark_target(state);
                    }
                }
                builder.build().expect("generated model is well-formed")
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_models_are_well_formed(cmdp in arb_cmdp()) {
            prop_assert!(cmdp.num_states() >= 2);
            prop_assert!(cmdp.num_actions() >= 1);
            prop_assert!(cmdp.reload_states().count() >= 1);
            for s in 0..cmdp.num_states() {
                for a in 0..cmdp.num_actions() {
                    let row = cmdp.successors(s, a);
                    prop_assert!(!row.is_empty());
                    let sum: f64 = row.iter().map(|&(_, p)| p).sum();
                    prop_assert!((sum - 1.0).abs() < 1e-9);
                }
            }
        }
    }
}
