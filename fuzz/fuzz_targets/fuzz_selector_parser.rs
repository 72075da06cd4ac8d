#![no_main]

use bindery_dom::{Document, FragmentNode, MemoryDocument, Selector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(selector) = Selector::parse(raw) else {
        return;
    };
    // Display output parses back to an equivalent selector.
    let reparsed = Selector::parse(&selector.to_string());
    assert!(reparsed.is_ok(), "{raw:?} -> {selector}");

    let mut doc = MemoryDocument::new();
    let root = doc.root();
    doc.append(
        root,
        FragmentNode::new("div")
            .attr("id", "app")
            .attr("class", "a b")
            .child(FragmentNode::new("input").attr("data-bind", "x")),
    );
    let _ = doc.query_all(root, &selector);
});
