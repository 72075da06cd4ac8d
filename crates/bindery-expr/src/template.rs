//! Textual passes over raw attribute values.
//!
//! Loop instances are produced by rewriting the loop variable inside each
//! declarative attribute of the template, and scoped apply passes decide
//! relevance from the raw attribute text. Both work on the text alone and
//! never consult state.

use bindery_core::is_valid_path;

use crate::token::operands;

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace every whole-identifier occurrence of `variable` with
/// `replacement`.
///
/// Occurrences inside a longer identifier (`itemize` for `item`) are left
/// alone. A path segment is a whole identifier, so `items.item` rewrites to
/// `items.0`.
///
/// ```
/// use bindery_expr::template::substitute;
///
/// assert_eq!(substitute("item.name", "item", "0"), "0.name");
/// assert_eq!(substitute("items.item.name", "item", "0"), "items.0.name");
/// assert_eq!(substitute("itemize", "item", "0"), "itemize");
/// assert_eq!(substitute("item.n==item", "item", "items.1"), "items.1.n==items.1");
/// ```
#[must_use]
pub fn substitute(raw: &str, variable: &str, replacement: &str) -> String {
    if variable.is_empty() {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        if is_ident_char(c) {
            let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            let (word, tail) = rest.split_at(end);
            out.push_str(if word == variable { replacement } else { word });
            rest = tail;
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

/// Whether an attribute value is affected by a change at `changed`.
///
/// True when the text contains `changed`, or when one of its path operands
/// is an ancestor of `changed` (`items` for `items.2`). Operands starting
/// with a digit are numeric literals and never count as ancestors.
#[must_use]
pub fn references(raw: &str, changed: &str) -> bool {
    if changed.is_empty() {
        return false;
    }
    raw.contains(changed)
        || operands(raw).any(|operand| {
            is_valid_path(operand)
                && !operand.starts_with(|c: char| c.is_ascii_digit())
                && changed
                    .strip_prefix(operand)
                    .is_some_and(|tail| tail.starts_with('.'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn substitutes_whole_identifiers_only() {
        assert_eq!(substitute("item", "item", "1"), "1");
        assert_eq!(substitute("item.price>=10", "item", "1"), "1.price>=10");
        assert_eq!(substitute("itemize", "item", "1"), "itemize");
        assert_eq!(substitute("myitem", "item", "1"), "myitem");
        assert_eq!(substitute("items.item", "item", "1"), "items.1");
        assert_eq!(substitute("a.item_x.item", "item", "1"), "a.item_x.1");
        assert_eq!(substitute("sel=item", "item", "2"), "sel=2");
    }

    #[test]
    fn substitutes_nested_loop_source() {
        assert_eq!(
            substitute("cell=row.cells", "row", "rows.0"),
            "cell=rows.0.cells"
        );
    }

    #[test]
    fn substitute_keeps_non_ascii_text() {
        assert_eq!(substitute("item==Zoë", "item", "3"), "3==Zoë");
    }

    #[test]
    fn references_by_text() {
        assert!(references("user.name", "user.name"));
        assert!(references("age>=18", "age"));
        assert!(!references("age>=18", "name"));
        assert!(!references("name", ""));
    }

    #[test]
    fn references_by_ancestor() {
        assert!(references("item=items", "items.2"));
        assert!(references("user", "user.address.city"));
        assert!(!references("user", "username"));
        assert!(!references("18", "18.5"));
    }

    proptest! {
        #[test]
        fn substitute_without_variable_is_identity(raw in "[a-z=<>.!0-9 ]{0,24}") {
            prop_assume!(!raw.split(|c: char| !is_ident_char(c)).any(|w| w == "q"));
            prop_assert_eq!(substitute(&raw, "q", "7"), raw);
        }

        #[test]
        fn substitute_prefix_path(field in "[a-z]{1,8}", index in 0usize..50) {
            prop_assume!(field != "item");
            let raw = format!("item.{field}");
            prop_assert_eq!(substitute(&raw, "item", &index.to_string()), format!("{index}.{field}"));
        }
    }
}
