//! `proptest` strategies for state trees, paths and attribute text.

use bindery_core::Value;
use proptest::prelude::*;

/// Identifier segment: `[A-Za-z_][A-Za-z_0-9]*`, short.
pub fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z_0-9]{0,6}"
}

/// Scalar leaf values of every primitive type.
pub fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i32..1000).prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ]
}

/// Text a form element could hold.
pub fn form_text() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z]{0,6}", "-?[0-9]{1,4}", Just("true".to_string()), Just(String::new())]
}

/// A two-level object tree together with the dotted path of every scalar
/// leaf in it.
pub fn state_tree() -> impl Strategy<Value = (Value, Vec<String>)> {
    let group = prop::collection::btree_map(identifier(), scalar(), 1..4);
    prop::collection::btree_map(identifier(), group, 1..4).prop_map(|groups| {
        let mut leaves = Vec::new();
        let root = Value::object(groups.into_iter().map(|(name, fields)| {
            for key in fields.keys() {
                leaves.push(format!("{name}.{key}"));
            }
            (name, Value::object(fields))
        }));
        (root, leaves)
    })
}

/// Strings that are never well-formed paths.
pub fn malformed_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(".".to_string()),
        "[a-z]{1,4}\\.",
        "\\.[a-z]{1,4}",
        "[a-z]{1,4}\\.\\.[a-z]{1,4}",
        "[0-9]{1,2}[a-z]{1,3}",
        "[a-z]{1,3}[ \\-+*/\\[\\]]{1,2}[a-z]{0,3}",
    ]
}

/// Attribute text built from paths, literals and operators, parseable or not.
pub fn attribute_text() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        identifier(),
        "[0-9]{1,3}",
        Just("==".to_string()),
        Just("!=".to_string()),
        Just("<=".to_string()),
        Just(">=".to_string()),
        Just("<".to_string()),
        Just("=".to_string()),
        Just(".".to_string()),
        Just(" ".to_string()),
    ];
    prop::collection::vec(token, 0..6).prop_map(|parts| parts.concat())
}
