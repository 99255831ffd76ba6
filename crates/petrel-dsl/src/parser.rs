// ParseError carries diagnostic spans and source fragments; boxing would
// lose the zero-copy benefit and complicate call sites throughout the crate.
#![allow(clippy::result_large_err)]

use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::errors::ParseError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct PetrelParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;

fn span_from(pair: &Pair<'_>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

/// Extract the next child from a pest iterator, returning a descriptive
/// error instead of panicking. The grammar guarantees structure, but we
/// prefer graceful errors in the AST-building phase.
fn next_child<'a>(
    iter: &mut pest::iterators::Pairs<'a, Rule>,
    context: &str,
) -> Result<Pair<'a>, ParseError> {
    iter.next().ok_or_else(|| ParseError::MissingSection {
        section: format!("expected child in {context}"),
    })
}

/// Parse a model file into an AST [`Model`].
///
/// # Parameters
/// - `source`: UTF-8 model source text.
/// - `filename`: Logical filename used in diagnostics.
pub fn parse(source: &str, filename: &str) -> Result<Model, ParseError> {
    let pairs = PetrelParser::parse(Rule::program, source).map_err(|e| {
        let (start, end) = match e.location {
            pest::error::InputLocation::Pos(p) => (p, p + 1),
            pest::error::InputLocation::Span((s, e)) => (s, e),
        };
        ParseError::syntax(format!("{e}"), Span::new(start, end), source, filename)
    })?;

    let program_pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::MissingSection {
            section: "program".into(),
        })?;

    let mut model = Model {
        constants: Vec::new(),
        modules: Vec::new(),
        rewards: Vec::new(),
        labels: Vec::new(),
    };

    for item in program_pair.into_inner() {
        match item.as_rule() {
            Rule::model_type | Rule::EOI => {}
            Rule::const_decl => {
                let decl = parse_const(item, source, filename)?;
                if model.constants.iter().any(|c| c.name == decl.name) {
                    return Err(ParseError::DuplicateConstant {
                        name: decl.name,
                        span: (decl.span.start, decl.span.end - decl.span.start).into(),
                        src: miette::NamedSource::new(filename, source.to_owned()),
                    });
                }
                model.constants.push(decl);
            }
            Rule::module_decl => {
                let span = span_from(&item);
                model
                    .modules
                    .push(Spanned::new(parse_module(item, source, filename)?, span));
            }
            Rule::rewards_decl => {
                let span = span_from(&item);
                model
                    .rewards
                    .push(Spanned::new(parse_rewards(item, source, filename)?, span));
            }
            Rule::label_decl => {
                let span = span_from(&item);
                model
                    .labels
                    .push(Spanned::new(parse_label(item, source, filename)?, span));
            }
            other => {
                return Err(ParseError::MissingSection {
                    section: format!("unexpected rule {other:?} at top level"),
                })
            }
        }
    }

    Ok(model)
}

fn parse_const(pair: Pair<'_>, source: &str, filename: &str) -> Result<ConstDecl, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let name = next_child(&mut inner, "const")?.as_str().to_string();
    let value = parse_int(next_child(&mut inner, "const")?, source, filename)?;
    Ok(ConstDecl { name, value, span })
}

fn parse_module(pair: Pair<'_>, source: &str, filename: &str) -> Result<ModuleDecl, ParseError> {
    let mut inner = pair.into_inner();
    let name = next_child(&mut inner, "module")?.as_str().to_string();
    let var = parse_var_decl(next_child(&mut inner, "module")?, source, filename)?;
    let mut commands = Vec::new();
    for cmd in inner {
        let span = span_from(&cmd);
        commands.push(Spanned::new(parse_command(cmd, source, filename)?, span));
    }
    Ok(ModuleDecl {
        name,
        var,
        commands,
    })
}

fn parse_var_decl(pair: Pair<'_>, source: &str, filename: &str) -> Result<VarDecl, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let name = next_child(&mut inner, "variable")?.as_str().to_string();
    let low = parse_int(next_child(&mut inner, "variable")?, source, filename)?;
    let high = parse_int(next_child(&mut inner, "variable")?, source, filename)?;
    let init = parse_int(next_child(&mut inner, "variable")?, source, filename)?;
    Ok(VarDecl {
        name,
        low,
        high,
        init,
        span,
    })
}

fn parse_command(pair: Pair<'_>, source: &str, filename: &str) -> Result<Command, ParseError> {
    let mut inner = pair.into_inner();
    let action = next_child(&mut inner, "command")?.as_str().to_string();
    let guard = parse_guard(next_child(&mut inner, "command")?, source, filename)?;
    let update_list = next_child(&mut inner, "command")?;
    let mut updates = Vec::new();
    for arm in update_list.into_inner() {
        updates.push(parse_update_arm(arm, source, filename)?);
    }
    Ok(Command {
        action,
        guard,
        updates,
    })
}

fn parse_update_arm(pair: Pair<'_>, source: &str, filename: &str) -> Result<UpdateArm, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let probability = parse_number(next_child(&mut inner, "update")?, source, filename)?;
    let var = next_child(&mut inner, "update")?.as_str().to_string();
    let value = parse_int(next_child(&mut inner, "update")?, source, filename)?;
    Ok(UpdateArm {
        probability,
        var,
        value,
        span,
    })
}

fn parse_rewards(pair: Pair<'_>, source: &str, filename: &str) -> Result<RewardsDecl, ParseError> {
    let mut inner = pair.into_inner();
    let name = string_content(next_child(&mut inner, "rewards")?);
    let mut items = Vec::new();
    for item in inner {
        let span = span_from(&item);
        let mut parts = item.into_inner();
        let action = next_child(&mut parts, "reward item")?.as_str().to_string();
        let guard = parse_guard(next_child(&mut parts, "reward item")?, source, filename)?;
        let reward = parse_int(next_child(&mut parts, "reward item")?, source, filename)?;
        items.push(Spanned::new(
            RewardItem {
                action,
                guard,
                reward,
            },
            span,
        ));
    }
    Ok(RewardsDecl { name, items })
}

fn parse_label(pair: Pair<'_>, source: &str, filename: &str) -> Result<LabelDecl, ParseError> {
    let mut inner = pair.into_inner();
    let name = string_content(next_child(&mut inner, "label")?);
    let disj = next_child(&mut inner, "label")?;
    let mut atoms = Vec::new();
    for atom in disj.into_inner() {
        atoms.push(parse_guard(atom, source, filename)?);
    }
    Ok(LabelDecl { name, atoms })
}

fn parse_guard(pair: Pair<'_>, source: &str, filename: &str) -> Result<Guard, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let var = next_child(&mut inner, "guard")?.as_str().to_string();
    let value = parse_int(next_child(&mut inner, "guard")?, source, filename)?;
    Ok(Guard { var, value, span })
}

fn string_content(pair: Pair<'_>) -> String {
    pair.as_str().trim_matches('"').to_string()
}

fn parse_int(pair: Pair<'_>, source: &str, filename: &str) -> Result<i64, ParseError> {
    let literal = pair.as_str();
    literal
        .parse::<i64>()
        .map_err(|e| invalid_number(&pair, literal, e.to_string(), source, filename))
}

fn parse_number(pair: Pair<'_>, source: &str, filename: &str) -> Result<f64, ParseError> {
    let literal = pair.as_str();
    literal
        .parse::<f64>()
        .map_err(|e| invalid_number(&pair, literal, e.to_string(), source, filename))
}

fn invalid_number(
    pair: &Pair<'_>,
    literal: &str,
    reason: String,
    source: &str,
    filename: &str,
) -> ParseError {
    let span = span_from(pair);
    ParseError::InvalidNumber {
        literal: literal.to_string(),
        reason,
        span: (span.start, span.end - span.start).into(),
        src: miette::NamedSource::new(filename, source.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROVER: &str = r#"
mdp

const int capacity = 12;

module rover
  loc : [0..4] init 0;

  [east] loc=0 -> 0.5:(loc'=1) + 0.5:(loc'=2);
  [west] loc=0 -> 1:(loc'=3);
  [east] loc=1 -> 1:(loc'=1);
  [west] loc=1 -> 1:(loc'=0);
  [east] loc=2 -> 1:(loc'=2);
  [west] loc=2 -> 1:(loc'=0);
  [east] loc=3 -> 1:(loc'=4);
  [west] loc=3 -> 1:(loc'=3);
  [east] loc=4 -> 1:(loc'=4);
  [west] loc=4 -> 1:(loc'=3);
endmodule

rewards "cost"
  [east] loc=0 : 1;
  [west] loc=0 : 2;
endrewards

label "reload" = loc=0 | loc=3;
label "target" = loc=2;
"#;

    #[test]
    fn parses_full_model() {
        let model = parse(ROVER, "rover.prism").expect("parse");
        assert_eq!(model.constants.len(), 1);
        assert_eq!(model.constant("capacity"), Some(12));
        assert_eq!(model.modules.len(), 1);

        let module = &model.modules[0].node;
        assert_eq!(module.name, "rover");
        assert_eq!(module.var.name, "loc");
        assert_eq!((module.var.low, module.var.high, module.var.init), (0, 4, 0));
        assert_eq!(module.commands.len(), 10);

        let first = &module.commands[0].node;
        assert_eq!(first.action, "east");
        assert_eq!(first.guard.value, 0);
        assert_eq!(first.updates.len(), 2);
        assert_eq!(first.updates[0].probability, 0.5);
        assert_eq!(first.updates[0].value, 1);

        assert_eq!(model.rewards.len(), 1);
        assert_eq!(model.rewards[0].node.name, "cost");
        assert_eq!(model.rewards[0].node.items.len(), 2);

        assert_eq!(model.labels.len(), 2);
        assert_eq!(model.labels[0].node.name, "reload");
        assert_eq!(
            model.labels[0]
                .node
                .atoms
                .iter()
                .map(|a| a.value)
                .collect::<Vec<_>>(),
            vec![0, 3]
        );
    }

    #[test]
    fn integer_probabilities_parse_as_floats() {
        let model = parse(ROVER, "rover.prism").expect("parse");
        let west = &model.modules[0].node.commands[1].node;
        assert_eq!(west.updates[0].probability, 1.0);
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let src = "module m\n  s : [0..1] init 0;\n  [a] s=0 -> 1:(s'=1)\nendmodule";
        let err = parse(src, "m.prism").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn two_modules_parse_syntactically() {
        // Shape restrictions are a lowering concern; the parser keeps both.
        let src = "module a\n s : [0..0] init 0;\n [x] s=0 -> 1:(s'=0);\nendmodule\n\
                   module b\n t : [0..0] init 0;\n [x] t=0 -> 1:(t'=0);\nendmodule";
        let model = parse(src, "m.prism").expect("parse");
        assert_eq!(model.modules.len(), 2);
    }

    #[test]
    fn duplicate_constant_is_rejected() {
        let src = "const int capacity = 1;\nconst int capacity = 2;";
        let err = parse(src, "m.prism").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateConstant { name, .. } if name == "capacity"));
    }

    #[test]
    fn comments_are_skipped() {
        let src = "// header\nconst int capacity = 3; // trailing\n";
        let model = parse(src, "m.prism").expect("parse");
        assert_eq!(model.constant("capacity"), Some(3));
    }

    #[test]
    fn empty_input_yields_empty_model() {
        let model = parse("", "m.prism").expect("parse");
        assert!(model.constants.is_empty());
        assert!(model.modules.is_empty());
    }

    #[test]
    fn negative_constants_are_allowed_syntactically() {
        let model = parse("const int capacity = -4;", "m.prism").expect("parse");
        assert_eq!(model.constant("capacity"), Some(-4));
    }
}
