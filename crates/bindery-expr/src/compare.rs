//! Comparison operators and their value semantics.
//!
//! Attribute values are untyped text, so comparisons convert between types
//! the way the document layer does:
//!
//! - `==` / `!=`: loose equality. `null` and `undefined` equal each other
//!   and nothing else; a number against a string compares numerically;
//!   booleans compare as `0`/`1`; composites compare structurally with each
//!   other and by their text form against scalars.
//! - `<`, `>`, `<=`, `>=`: two strings compare lexicographically, anything
//!   else numerically. A `NaN` on either side makes every relation false.

use std::cmp::Ordering;
use std::fmt;

use bindery_core::Value;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }

    /// Evaluate `left <op> right`.
    #[must_use]
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Eq => loose_eq(left, right),
            Self::Ne => !loose_eq(left, right),
            Self::Gt => relate(left, right).is_some_and(Ordering::is_gt),
            Self::Lt => relate(left, right).is_some_and(Ordering::is_lt),
            Self::Ge => relate(left, right).is_some_and(Ordering::is_ge),
            Self::Le => relate(left, right).is_some_and(Ordering::is_le),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn bool_number(b: bool) -> Value {
    Value::Number(if b { 1.0 } else { 0.0 })
}

/// Loose equality.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    use Value as V;
    match (left, right) {
        (V::Undefined | V::Null, V::Undefined | V::Null) => true,
        (V::Undefined | V::Null, _) | (_, V::Undefined | V::Null) => false,
        (V::Number(a), V::Number(b)) => a == b,
        (V::String(a), V::String(b)) => a == b,
        (V::Bool(a), V::Bool(b)) => a == b,
        (V::Number(n), V::String(s)) | (V::String(s), V::Number(n)) => {
            *n == V::String(s.clone()).to_number()
        }
        (V::Bool(b), other) | (other, V::Bool(b)) => loose_eq(&bool_number(*b), other),
        (a, b) if a.is_composite() && b.is_composite() => a == b,
        (composite, scalar) if composite.is_composite() => {
            loose_eq(&V::String(composite.to_display_string()), scalar)
        }
        (scalar, composite) => loose_eq(scalar, &V::String(composite.to_display_string())),
    }
}

fn primitive(value: &Value) -> Value {
    if value.is_composite() {
        Value::String(value.to_display_string())
    } else {
        value.clone()
    }
}

/// Relational ordering, or `None` when the operands are unordered.
#[must_use]
pub fn relate(left: &Value, right: &Value) -> Option<Ordering> {
    match (primitive(left), primitive(right)) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(&b)),
        (a, b) => a.to_number().partial_cmp(&b.to_number()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> Value {
        Value::from_literal(raw)
    }

    #[test]
    fn equality_across_types() {
        assert!(loose_eq(&v("1"), &Value::from("1")));
        assert!(loose_eq(&Value::Null, &Value::Undefined));
        assert!(!loose_eq(&Value::Null, &Value::from(0)));
        assert!(loose_eq(&Value::Bool(true), &Value::from(1)));
        assert!(loose_eq(&Value::Bool(false), &Value::from("0")));
        assert!(loose_eq(&Value::from(""), &Value::from(0)));
        assert!(!loose_eq(&Value::from("Alice"), &Value::from("alice")));
        assert!(loose_eq(&Value::array([1, 2]), &Value::from("1,2")));
        assert!(loose_eq(&Value::array([1]), &Value::array([1])));
    }

    #[test]
    fn nan_never_equal() {
        let nan = Value::Number(f64::NAN);
        assert!(!CompareOp::Eq.apply(&nan, &nan));
        assert!(CompareOp::Ne.apply(&nan, &nan));
    }

    #[test]
    fn relations_numeric() {
        assert!(CompareOp::Ge.apply(&Value::from(20), &Value::from(18)));
        assert!(CompareOp::Ge.apply(&Value::from(18), &Value::from(18)));
        assert!(!CompareOp::Ge.apply(&Value::from(10), &Value::from(18)));
        assert!(CompareOp::Lt.apply(&Value::from("9"), &Value::from(10)));
        assert!(CompareOp::Le.apply(&Value::Null, &Value::from(0)));
    }

    #[test]
    fn relations_lexicographic_for_strings() {
        // "9" > "10" as text.
        assert!(CompareOp::Gt.apply(&Value::from("9"), &Value::from("10")));
        assert!(CompareOp::Lt.apply(&Value::from("apple"), &Value::from("banana")));
    }

    #[test]
    fn relations_with_nan_are_false() {
        let word = Value::from("abc");
        for op in [CompareOp::Gt, CompareOp::Lt, CompareOp::Ge, CompareOp::Le] {
            assert!(!op.apply(&word, &Value::from(1)), "{op} should be false");
            assert!(!op.apply(&Value::Undefined, &Value::from(1)), "{op} should be false");
        }
    }
}
