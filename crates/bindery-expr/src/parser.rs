//! Expression parser.
//!
//! # Grammar
//!
//! ```text
//! expression := assignment | rhs
//! assignment := operand "=" rhs
//! rhs        := comparison | operand
//! comparison := operand ("==" | "!=" | ">" | "<" | ">=" | "<=") operand
//! operand    := path | literal
//! ```
//!
//! Precedence is assignment, then comparison, then path, then literal. An
//! operand is a `Path` when it is a well-formed path that exists in state at
//! parse time, otherwise a `Literal`. A comparison side left blank is the
//! empty string literal, so `name==` holds when `name` is empty.
//!
//! # Failure Modes
//!
//! | Input | Result |
//! |-------|--------|
//! | `""` | `Unparseable(Empty)` |
//! | `a=` | `Unparseable(EmptyOperand)` |
//! | `a<b<c` | `Unparseable(ChainedComparison)` |
//! | `a=b=c` | `Unparseable(NestedAssignment)` |
//! | `a<b=c` | `Unparseable(MissingAssignee)` |

use bindery_core::{PathLookup, Value};

use crate::error::ParseError;
use crate::expression::Expression;
use crate::token::{Operator, Token, tokenize};

/// Parses attribute expressions against one state.
///
/// Holds no state of its own between calls; every `parse` reads the
/// current state afresh.
pub struct ExpressionEngine<'s, S: PathLookup + ?Sized> {
    state: &'s S,
}

impl<'s, S: PathLookup + ?Sized> ExpressionEngine<'s, S> {
    pub fn new(state: &'s S) -> Self {
        Self { state }
    }

    /// Parse and evaluate `raw`; failures become `Expression::Unparseable`.
    pub fn parse(&self, raw: &str) -> Expression {
        parse(raw, self.state)
    }
}

/// Parse and evaluate `raw`; failures become `Expression::Unparseable`.
pub fn parse<S: PathLookup + ?Sized>(raw: &str, state: &S) -> Expression {
    try_parse(raw, state).unwrap_or_else(|error| Expression::Unparseable {
        raw: raw.to_string(),
        error,
    })
}

/// Parse and evaluate `raw`, reporting grammar failures as errors.
pub fn try_parse<S: PathLookup + ?Sized>(raw: &str, state: &S) -> Result<Expression, ParseError> {
    let tokens = tokenize(raw);
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let Some(split) = tokens.iter().position(Token::is_assign) else {
        return parse_rhs(&tokens, state);
    };
    let (left, right) = (&tokens[..split], &tokens[split + 1..]);
    let [Token::Operand(assignee)] = left else {
        return Err(ParseError::MissingAssignee);
    };
    if right.iter().any(Token::is_assign) {
        return Err(ParseError::NestedAssignment);
    }
    Ok(Expression::Assignment {
        assignee: (*assignee).to_string(),
        assigned: Box::new(parse_rhs(right, state)?),
    })
}

fn parse_rhs<S: PathLookup + ?Sized>(
    tokens: &[Token<'_>],
    state: &S,
) -> Result<Expression, ParseError> {
    let (left, op, right) = match tokens {
        [Token::Operand(text)] => return Ok(operand(text, state)),
        [
            Token::Operand(left),
            Token::Op(Operator::Compare(op)),
            Token::Operand(right),
        ] => (operand(left, state), *op, operand(right, state)),
        // A missing side compares as the empty string: `name==` tests for "".
        [Token::Operand(left), Token::Op(Operator::Compare(op))] => {
            (operand(left, state), *op, empty_literal())
        }
        [Token::Op(Operator::Compare(op)), Token::Operand(right)] => {
            (empty_literal(), *op, operand(right, state))
        }
        [Token::Op(Operator::Compare(op))] => (empty_literal(), *op, empty_literal()),
        _ if tokens.iter().filter(|t| t.is_operator()).count() > 1 => {
            return Err(ParseError::ChainedComparison);
        }
        _ => return Err(ParseError::EmptyOperand),
    };
    let result = match (left.value(), right.value()) {
        (Some(l), Some(r)) => op.apply(&l, &r),
        _ => false,
    };
    Ok(Expression::Comparison {
        op,
        left: Box::new(left),
        right: Box::new(right),
        result,
    })
}

fn empty_literal() -> Expression {
    Expression::Literal {
        value: Value::String(String::new()),
    }
}

fn operand<S: PathLookup + ?Sized>(text: &str, state: &S) -> Expression {
    match state.retrieve(text) {
        Ok(value) => Expression::Path {
            path: text.to_string(),
            value,
        },
        Err(_) => Expression::Literal {
            value: Value::from_literal(text),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::CompareOp;
    use crate::expression::ExpressionKind;
    use pretty_assertions::assert_eq;

    fn state() -> Value {
        Value::object([
            ("name", Value::from("Alice")),
            ("age", Value::from(20)),
            ("items", Value::array([1, 2])),
            ("role", Value::from("admin")),
        ])
    }

    #[test]
    fn path_operand() {
        assert_eq!(
            parse("name", &state()),
            Expression::Path {
                path: "name".into(),
                value: Value::from("Alice")
            }
        );
    }

    #[test]
    fn literal_operands() {
        let s = state();
        assert_eq!(parse("18", &s).value(), Some(Value::Number(18.0)));
        assert_eq!(parse("true", &s).value(), Some(Value::Bool(true)));
        assert_eq!(parse("null", &s).value(), Some(Value::Null));
        assert_eq!(parse("unknown.path", &s).kind(), ExpressionKind::Literal);
        assert_eq!(
            parse("unknown.path", &s).value(),
            Some(Value::from("unknown.path"))
        );
    }

    #[test]
    fn comparison_evaluates() {
        let s = state();
        let expr = parse("age>=18", &s);
        assert_eq!(expr.kind(), ExpressionKind::Comparison);
        assert_eq!(expr.value(), Some(Value::Bool(true)));
        assert_eq!(parse("name==Alice", &s).value(), Some(Value::Bool(true)));
        assert_eq!(parse("name != Alice", &s).value(), Some(Value::Bool(false)));
        assert_eq!(parse("age<18", &s).value(), Some(Value::Bool(false)));
    }

    #[test]
    fn less_or_equal_is_not_an_assignment() {
        let expr = parse("age<=20", &state());
        let Expression::Comparison { op, result, .. } = expr else {
            panic!("expected comparison, got {expr:?}");
        };
        assert_eq!(op, CompareOp::Le);
        assert!(result);
    }

    #[test]
    fn assignment_keeps_raw_assignee() {
        let expr = parse("role=editor", &state());
        assert_eq!(
            expr,
            Expression::Assignment {
                assignee: "role".into(),
                assigned: Box::new(Expression::Literal {
                    value: Value::from("editor")
                }),
            }
        );
        assert_eq!(expr.value(), Some(Value::from("editor")));
    }

    #[test]
    fn assignment_of_path_and_comparison() {
        let s = state();
        let expr = parse("item=items", &s);
        let Expression::Assignment { assignee, assigned } = &expr else {
            panic!("expected assignment");
        };
        assert_eq!(assignee, "item");
        assert_eq!(assigned.kind(), ExpressionKind::Path);
        assert_eq!(expr.value(), Some(Value::array([1, 2])));

        let expr = parse("adult=age>=18", &s);
        assert_eq!(expr.kind(), ExpressionKind::Assignment);
        assert_eq!(expr.value(), Some(Value::Bool(true)));
    }

    #[test]
    fn grammar_failures() {
        let s = state();
        let cases = [
            ("", ParseError::Empty),
            ("   ", ParseError::Empty),
            ("age=", ParseError::EmptyOperand),
            ("ok= ", ParseError::EmptyOperand),
            ("=1", ParseError::MissingAssignee),
            ("a<b<c", ParseError::ChainedComparison),
            ("a=b=c", ParseError::NestedAssignment),
            ("a<b=c", ParseError::MissingAssignee),
        ];
        for (raw, expected) in cases {
            assert_eq!(try_parse(raw, &s), Err(expected), "input {raw:?}");
            assert!(!parse(raw, &s).is_parseable());
        }
    }

    #[test]
    fn blank_comparison_side_is_empty_string() {
        let s = Value::object([("name", ""), ("city", "Oslo")]);
        let expr = parse("name==", &s);
        assert_eq!(
            expr,
            Expression::Comparison {
                op: CompareOp::Eq,
                left: Box::new(Expression::Path {
                    path: "name".into(),
                    value: Value::from("")
                }),
                right: Box::new(Expression::Literal {
                    value: Value::from("")
                }),
                result: true,
            }
        );
        assert_eq!(parse("city==", &s).value(), Some(Value::Bool(false)));
        assert_eq!(parse("!=city", &s).value(), Some(Value::Bool(true)));
        assert_eq!(parse("==", &s).value(), Some(Value::Bool(true)));
        assert_eq!(
            parse("blank=name==", &s).value(),
            Some(Value::Bool(true))
        );
    }

    #[test]
    fn referenced_paths_walks_tree() {
        let s = state();
        assert_eq!(parse("ok=age>=18", &s).referenced_paths(), vec!["age"]);
        assert_eq!(parse("name==role", &s).referenced_paths(), vec!["name", "role"]);
        assert!(parse("3<4", &s).referenced_paths().is_empty());
    }

    #[test]
    fn engine_reads_live_state() {
        let state = bindery_runtime::ObservableState::new(state());
        let engine = ExpressionEngine::new(&state);
        assert_eq!(engine.parse("age>=21").value(), Some(Value::Bool(false)));
        state.set_path("age", 30).unwrap();
        assert_eq!(engine.parse("age>=21").value(), Some(Value::Bool(true)));
    }
}
