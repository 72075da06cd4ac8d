#![no_main]

use bindery_core::Value;
use bindery_expr::template::{references, substitute};
use bindery_expr::{Expression, parse, tokenize, try_parse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let state = Value::object([
        ("a", Value::from(1)),
        ("b", Value::from("1")),
        ("items", Value::array([1, 2, 3])),
        ("user", Value::object([("name", "x")])),
    ]);

    let _ = tokenize(raw);
    let expr = parse(raw, &state);
    // Parsing twice gives the same tree.
    assert_eq!(format!("{expr:?}"), format!("{:?}", parse(raw, &state)));
    assert_eq!(try_parse(raw, &state).is_ok(), expr.is_parseable());
    if let Expression::Unparseable { .. } = expr {
        assert!(expr.value().is_none());
    }

    let rewritten = substitute(raw, "a", "items.0");
    let _ = parse(&rewritten, &state);
    let _ = references(raw, "items.1");
});
