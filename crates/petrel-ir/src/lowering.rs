//! Lowering from the parsed model AST to the explicit [`Cmdp`].
//!
//! All model-shape restrictions live here: exactly one module, a `cost`
//! rewards structure, `reload`/`target` labels, uniform action arity.
//! Violations surface as [`LoweringError`] values, optionally wrapped with
//! source spans for pretty-printed diagnostics.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::cmdp::{Cmdp, CmdpBuilder, ModelError};
use petrel_dsl::ast;

pub const REWARDS_NAME: &str = "cost";
pub const RELOAD_LABEL: &str = "reload";
pub const TARGET_LABEL: &str = "target";
pub const CAPACITY_CONSTANT: &str = "capacity";

#[derive(Debug, Error)]
pub enum LoweringError {
    #[error("model must declare exactly one module, found {0}")]
    ModuleCount(usize),
    #[error("missing rewards structure \"cost\"")]
    MissingRewards,
    #[error("missing label \"{0}\"")]
    MissingLabel(&'static str),
    #[error("unsupported label \"{0}\" (only \"reload\" and \"target\" are recognised)")]
    UnknownLabel(String),
    #[error("state variable range must start at 0, got [{low}..{high}]")]
    RangeNotZeroBased { low: i64, high: i64 },
    #[error("invalid range for state variable '{var}': [{low}..{high}]")]
    InvalidRange { var: String, low: i64, high: i64 },
    #[error("init value {init} outside state range [0..{high}]")]
    InitOutOfRange { init: i64, high: i64 },
    #[error("guard references '{found}' but the module variable is '{expected}'")]
    GuardVariableMismatch { expected: String, found: String },
    #[error("update assigns '{found}' but the module variable is '{expected}'")]
    UpdateVariableMismatch { expected: String, found: String },
    #[error("value {value} outside state range [0..{high}]")]
    ValueOutOfRange { value: i64, high: i64 },
    #[error("state {state} has no command")]
    NoCommands { state: usize },
    #[error("state {state} has {found} commands but state 0 has {expected} (uniform arity required)")]
    VariableArity {
        state: usize,
        expected: usize,
        found: usize,
    },
    #[error("reward item [{action}] at state {state} matches no command")]
    RewardWithoutCommand { action: String, state: i64 },
    #[error("negative reward {value} for action [{action}]")]
    NegativeReward { action: String, value: i64 },
    #[error("constant 'capacity' must be non-negative, got {0}")]
    NegativeCapacity(i64),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A lowering error enriched with source span information.
#[derive(Debug, Error, Diagnostic)]
#[error("{inner}")]
pub struct SpannedLoweringError {
    #[source_code]
    pub src: NamedSource<String>,
    pub inner: LoweringError,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl SpannedLoweringError {
    fn new(
        err: LoweringError,
        source: &str,
        filename: &str,
        span: Option<ast::Span>,
    ) -> Self {
        Self {
            src: NamedSource::new(filename, source.to_owned()),
            inner: err,
            span: span.map(|s| SourceSpan::new(s.start.into(), s.end - s.start)),
        }
    }
}

/// Result of lowering: the explicit model plus the declared capacity, if
/// any. (A missing capacity is only an error once the caller has no
/// override to fall back on.)
#[derive(Debug, Clone)]
pub struct Lowered {
    pub cmdp: Cmdp,
    pub capacity: Option<u32>,
}

/// Lower a parsed model, attaching source spans to any error.
pub fn lower_with_source(
    model: &ast::Model,
    source: &str,
    filename: &str,
) -> Result<Lowered, SpannedLoweringError> {
    lower(model).map_err(|err| {
        let span = find_span_for_error(&err, model);
        SpannedLoweringError::new(err, source, filename, span)
    })
}

/// Lower a parsed model into an explicit [`Cmdp`].
pub fn lower(model: &ast::Model) -> Result<Lowered, LoweringError> {
    if model.modules.len() != 1 {
        return Err(LoweringError::ModuleCount(model.modules.len()));
    }
    let module = &model.modules[0].node;
    let var = &module.var;

    if var.low != 0 {
        return Err(LoweringError::RangeNotZeroBased {
            low: var.low,
            high: var.high,
        });
    }
    if var.high < var.low {
        return Err(LoweringError::InvalidRange {
            var: var.name.clone(),
            low: var.low,
            high: var.high,
        });
    }
    if var.init < 0 || var.init > var.high {
        return Err(LoweringError::InitOutOfRange {
            init: var.init,
            high: var.high,
        });
    }
    let num_states = (var.high + 1) as usize;

    // Group commands by source state, preserving declaration order.
    let mut per_state: Vec<Vec<&ast::Command>> = vec![Vec::new(); num_states];
    for command in &module.commands {
        let command = &command.node;
        check_var(&command.guard.var, &var.name, true)?;
        let state = state_value(command.guard.value, var.high)?;
        for arm in &command.updates {
            check_var(&arm.var, &var.name, false)?;
            state_value(arm.value, var.high)?;
        }
        per_state[state].push(command);
    }

    let num_actions = per_state[0].len();
    for (state, commands) in per_state.iter().enumerate() {
        if commands.is_empty() {
            return Err(LoweringError::NoCommands { state });
        }
        if commands.len() != num_actions {
            return Err(LoweringError::VariableArity {
                state,
                expected: num_actions,
                found: commands.len(),
            });
        }
    }

    let rewards = model
        .rewards
        .iter()
        .find(|r| r.node.name == REWARDS_NAME)
        .ok_or(LoweringError::MissingRewards)?;

    let mut builder = CmdpBuilder::new(num_states, num_actions);

    for (state, commands) in per_state.iter().enumerate() {
        for (action, command) in commands.iter().enumerate() {
            for arm in &command.updates {
                builder.add_successor(state, action, arm.value as usize, arm.probability);
            }
        }
    }

    // Costs: sum every reward item matching the command's action label and
    // source state; unmatched entries default to 0.
    let mut costs = vec![0u32; num_states * num_actions];
    for item in &rewards.node.items {
        let item = &item.node;
        check_var(&item.guard.var, &var.name, true)?;
        let state = state_value(item.guard.value, var.high)?;
        if item.reward < 0 {
            return Err(LoweringError::NegativeReward {
                action: item.action.clone(),
                value: item.reward,
            });
        }
        let mut matched = false;
        for (action, command) in per_state[state].iter().enumerate() {
            if command.action == item.action {
                matched = true;
                let slot = &mut costs[state * num_actions + action];
                *slot = slot.saturating_add(item.reward as u32);
            }
        }
        if !matched {
            return Err(LoweringError::RewardWithoutCommand {
                action: item.action.clone(),
                state: item.guard.value,
            });
        }
    }
    for state in 0..num_states {
        for action in 0..num_actions {
            builder.set_cost(state, action, costs[state * num_actions + action]);
        }
    }

    let mut saw_reload = false;
    let mut saw_target = false;
    for label in &model.labels {
        let label = &label.node;
        let mark_reload = match label.name.as_str() {
            RELOAD_LABEL => true,
            TARGET_LABEL => false,
            other => return Err(LoweringError::UnknownLabel(other.to_string())),
        };
        if mark_reload {
            saw_reload = true;
        } else {
            saw_target = true;
        }
        for atom in &label.atoms {
            check_var(&atom.var, &var.name, true)?;
            let state = state_value(atom.value, var.high)?;
            if mark_reload {
                builder.mark_reload(state);
            } else {
                builder.mark_target(state);
            }
        }
    }
    if !saw_reload {
        return Err(LoweringError::MissingLabel(RELOAD_LABEL));
    }
    if !saw_target {
        return Err(LoweringError::MissingLabel(TARGET_LABEL));
    }

    let capacity = match model.constant(CAPACITY_CONSTANT) {
        Some(c) if c < 0 => return Err(LoweringError::NegativeCapacity(c)),
        Some(c) => Some(c as u32),
        None => None,
    };

    let cmdp = builder.build()?;
    Ok(Lowered { cmdp, capacity })
}

fn check_var(found: &str, expected: &str, in_guard: bool) -> Result<(), LoweringError> {
    if found == expected {
        return Ok(());
    }
    if in_guard {
        Err(LoweringError::GuardVariableMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    } else {
        Err(LoweringError::UpdateVariableMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

fn state_value(value: i64, high: i64) -> Result<usize, LoweringError> {
    if value < 0 || value > high {
        return Err(LoweringError::ValueOutOfRange { value, high });
    }
    Ok(value as usize)
}

/// Best-effort span lookup for a lowering error by examining the AST.
fn find_span_for_error(err: &LoweringError, model: &ast::Model) -> Option<ast::Span> {
    match err {
        LoweringError::ModuleCount(n) if *n > 1 => Some(model.modules[1].span),
        LoweringError::RangeNotZeroBased { .. }
        | LoweringError::InvalidRange { .. }
        | LoweringError::InitOutOfRange { .. } => {
            model.modules.first().map(|m| m.node.var.span)
        }
        LoweringError::GuardVariableMismatch { found, .. } => guard_span(model, |g| g.var == *found),
        LoweringError::UpdateVariableMismatch { found, .. } => model
            .modules
            .iter()
            .flat_map(|m| &m.node.commands)
            .flat_map(|c| &c.node.updates)
            .find(|a| a.var == *found)
            .map(|a| a.span),
        LoweringError::ValueOutOfRange { value, .. } => guard_span(model, |g| g.value == *value),
        LoweringError::RewardWithoutCommand { action, state } => model
            .rewards
            .iter()
            .flat_map(|r| &r.node.items)
            .find(|i| i.node.action == *action && i.node.guard.value == *state)
            .map(|i| i.span),
        LoweringError::UnknownLabel(name) => model
            .labels
            .iter()
            .find(|l| l.node.name == *name)
            .map(|l| l.span),
        LoweringError::NegativeCapacity(_) => model
            .constants
            .iter()
            .find(|c| c.name == CAPACITY_CONSTANT)
            .map(|c| c.span),
        _ => None,
    }
}

fn guard_span(model: &ast::Model, pred: impl Fn(&ast::Guard) -> bool) -> Option<ast::Span> {
    model
        .modules
        .iter()
        .flat_map(|m| &m.node.commands)
        .map(|c| &c.node.guard)
        .chain(
            model
                .rewards
                .iter()
                .flat_map(|r| &r.node.items)
                .map(|i| &i.node.guard),
        )
        .chain(model.labels.iter().flat_map(|l| &l.node.atoms))
        .find(|g| pred(g))
        .map(|g| g.span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petrel_dsl::parse;

    const TWO_STATE_LOOP: &str = r#"
const int capacity = 2;

module loop
  s : [0..1] init 0;

  [step] s=0 -> 1:(s'=1);
  [step] s=1 -> 1:(s'=0);
endmodule

rewards "cost"
  [step] s=0 : 1;
  [step] s=1 : 1;
endrewards

label "reload" = s=0;
label "target" = s=1;
"#;

    fn lower_source(src: &str) -> Result<Lowered, LoweringError> {
        lower(&parse(src, "test.prism").expect("parse"))
    }

    #[test]
    fn lowers_two_state_loop() {
        let lowered = lower_source(TWO_STATE_LOOP).expect("lower");
        assert_eq!(lowered.capacity, Some(2));
        let cmdp = lowered.cmdp;
        assert_eq!(cmdp.num_states(), 2);
        assert_eq!(cmdp.num_actions(), 1);
        assert_eq!(cmdp.cost(0, 0), 1);
        assert_eq!(cmdp.cost(1, 0), 1);
        assert_eq!(cmdp.successors(0, 0), &[(1, 1.0)]);
        assert!(cmdp.is_reload(0));
        assert!(cmdp.is_target(1));
    }

    #[test]
    fn missing_capacity_is_not_an_error_here() {
        let src = TWO_STATE_LOOP.replace("const int capacity = 2;\n", "");
        let lowered = lower_source(&src).expect("lower");
        assert_eq!(lowered.capacity, None);
    }

    #[test]
    fn two_modules_are_rejected() {
        let src = format!(
            "{TWO_STATE_LOOP}\nmodule extra\n t : [0..0] init 0;\n [x] t=0 -> 1:(t'=0);\nendmodule"
        );
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::ModuleCount(2))
        ));
    }

    #[test]
    fn missing_cost_rewards_is_rejected() {
        let src = TWO_STATE_LOOP.replace("rewards \"cost\"", "rewards \"fuel\"");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::MissingRewards)
        ));
    }

    #[test]
    fn missing_labels_are_rejected() {
        let src = TWO_STATE_LOOP.replace("label \"reload\" = s=0;\n", "");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::MissingLabel("reload"))
        ));
        let src = TWO_STATE_LOOP.replace("label \"target\" = s=1;\n", "");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::MissingLabel("target"))
        ));
    }

    #[test]
    fn variable_arity_is_rejected() {
        let src = TWO_STATE_LOOP.replace(
            "  [step] s=1 -> 1:(s'=0);\n",
            "  [step] s=1 -> 1:(s'=0);\n  [back] s=1 -> 1:(s'=1);\n",
        );
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::VariableArity {
                state: 1,
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn stateless_states_are_rejected() {
        let src = TWO_STATE_LOOP.replace("s : [0..1]", "s : [0..2]");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::NoCommands { state: 2 })
        ));
    }

    #[test]
    fn reward_for_unknown_command_is_rejected() {
        let src = TWO_STATE_LOOP.replace(
            "[step] s=1 : 1;",
            "[step] s=1 : 1;\n  [phantom] s=1 : 3;",
        );
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::RewardWithoutCommand { action, state: 1 }) if action == "phantom"
        ));
    }

    #[test]
    fn repeated_reward_items_accumulate() {
        let src = TWO_STATE_LOOP.replace("[step] s=0 : 1;", "[step] s=0 : 1;\n  [step] s=0 : 2;");
        let lowered = lower_source(&src).expect("lower");
        assert_eq!(lowered.cmdp.cost(0, 0), 3);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let src = format!("{TWO_STATE_LOOP}label \"goal\" = s=1;\n");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::UnknownLabel(name)) if name == "goal"
        ));
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let src = TWO_STATE_LOOP.replace("capacity = 2", "capacity = -1");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::NegativeCapacity(-1))
        ));
    }

    #[test]
    fn guard_variable_mismatch_is_rejected() {
        let src = TWO_STATE_LOOP.replace("[step] s=0 -> 1:(s'=1);", "[step] t=0 -> 1:(s'=1);");
        assert!(matches!(
            lower_source(&src),
            Err(LoweringError::GuardVariableMismatch { found, .. }) if found == "t"
        ));
    }

    #[test]
    fn spanned_errors_point_at_the_offender() {
        let src = format!("{TWO_STATE_LOOP}label \"goal\" = s=1;\n");
        let model = parse(&src, "test.prism").expect("parse");
        let err = lower_with_source(&model, &src, "test.prism").unwrap_err();
        assert!(err.span.is_some());
        assert!(matches!(err.inner, LoweringError::UnknownLabel(_)));
    }
}
