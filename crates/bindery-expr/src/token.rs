//! Tokenizer for attribute expressions.
//!
//! The input is split into operand runs and operator tokens. Operators are
//! matched longest-first, so `<=` is always one token and never `<` followed
//! by an operand starting with `=`. A `!` that is not followed by `=` is
//! ordinary operand text. Operand text is trimmed; runs that are empty after
//! trimming are dropped, which leaves missing operands visible to the parser
//! as two adjacent operators or an operator at either end.

use crate::compare::CompareOp;

/// An operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Compare(CompareOp),
}

/// One lexical unit of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Operand(&'a str),
    Op(Operator),
}

impl Token<'_> {
    #[must_use]
    pub fn is_assign(&self) -> bool {
        matches!(self, Token::Op(Operator::Assign))
    }

    #[must_use]
    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Op(_))
    }
}

const OPERATORS: [(&str, Operator); 7] = [
    ("==", Operator::Compare(CompareOp::Eq)),
    ("!=", Operator::Compare(CompareOp::Ne)),
    ("<=", Operator::Compare(CompareOp::Le)),
    (">=", Operator::Compare(CompareOp::Ge)),
    ("<", Operator::Compare(CompareOp::Lt)),
    (">", Operator::Compare(CompareOp::Gt)),
    ("=", Operator::Assign),
];

fn operator_at(rest: &str) -> Option<(usize, Operator)> {
    OPERATORS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .map(|(symbol, op)| (symbol.len(), *op))
}

/// Split `raw` into tokens.
///
/// ```
/// use bindery_expr::{CompareOp, Operator, Token, tokenize};
///
/// assert_eq!(
///     tokenize("age <= 18"),
///     vec![
///         Token::Operand("age"),
///         Token::Op(Operator::Compare(CompareOp::Le)),
///         Token::Operand("18"),
///     ]
/// );
/// ```
#[must_use]
pub fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < raw.len() {
        if let Some((len, op)) = operator_at(&raw[pos..]) {
            push_operand(&mut tokens, &raw[start..pos]);
            tokens.push(Token::Op(op));
            pos += len;
            start = pos;
        } else {
            // Operators are ASCII, so stepping by whole chars never splits one.
            pos += raw[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }
    push_operand(&mut tokens, &raw[start..]);
    tokens
}

fn push_operand<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        tokens.push(Token::Operand(text));
    }
}

/// Operand texts of `raw`, in order.
pub fn operands(raw: &str) -> impl Iterator<Item = &str> {
    tokenize(raw).into_iter().filter_map(|token| match token {
        Token::Operand(text) => Some(text),
        Token::Op(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LE: Token<'static> = Token::Op(Operator::Compare(CompareOp::Le));
    const GE: Token<'static> = Token::Op(Operator::Compare(CompareOp::Ge));
    const EQ: Token<'static> = Token::Op(Operator::Compare(CompareOp::Eq));
    const NE: Token<'static> = Token::Op(Operator::Compare(CompareOp::Ne));
    const ASSIGN: Token<'static> = Token::Op(Operator::Assign);

    #[test]
    fn longest_match_wins() {
        assert_eq!(
            tokenize("a<=b"),
            vec![Token::Operand("a"), LE, Token::Operand("b")]
        );
        assert_eq!(
            tokenize("a>=b"),
            vec![Token::Operand("a"), GE, Token::Operand("b")]
        );
        assert_eq!(
            tokenize("a!=b"),
            vec![Token::Operand("a"), NE, Token::Operand("b")]
        );
    }

    #[test]
    fn assignment_with_comparison() {
        assert_eq!(
            tokenize("ok=x==1"),
            vec![
                Token::Operand("ok"),
                ASSIGN,
                Token::Operand("x"),
                EQ,
                Token::Operand("1")
            ]
        );
    }

    #[test]
    fn bang_alone_is_text() {
        assert_eq!(tokenize("!flag"), vec![Token::Operand("!flag")]);
    }

    #[test]
    fn whitespace_is_trimmed_and_empty_runs_dropped() {
        assert_eq!(tokenize("  name  "), vec![Token::Operand("name")]);
        assert_eq!(tokenize("a== "), vec![Token::Operand("a"), EQ]);
        assert_eq!(tokenize(""), Vec::<Token<'_>>::new());
    }

    #[test]
    fn non_ascii_operands() {
        assert_eq!(
            tokenize("naam==Zoë"),
            vec![Token::Operand("naam"), EQ, Token::Operand("Zoë")]
        );
    }

    #[test]
    fn operands_iterates_texts() {
        assert_eq!(operands("item=items").collect::<Vec<_>>(), vec!["item", "items"]);
    }
}
