#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use bindery_binding::BindingController;
use bindery_core::Value;
use bindery_dom::{Document, DomEvent, EventKind, EventRegistry, FragmentNode, MemoryDocument};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Role {
    Bind,
    Read,
    Write,
    Click,
    ActiveIf,
    Loop,
}

impl Role {
    fn attribute(&self) -> &'static str {
        match self {
            Self::Bind => "data-bind",
            Self::Read => "data-read",
            Self::Write => "data-write",
            Self::Click => "data-click",
            Self::ActiveIf => "data-active-if",
            Self::Loop => "data-loop",
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Action {
    Change { element: u8, text: String },
    Click { element: u8 },
    Set { path: String, number: i16 },
    Push { text: String },
    Pop,
}

#[derive(Debug, Arbitrary)]
struct Input {
    elements: Vec<(Role, String)>,
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    if input.elements.len() > 16 || input.actions.len() > 32 {
        return;
    }
    let mut doc = MemoryDocument::new();
    let root = doc.root();
    let app = doc.append(root, FragmentNode::new("div").attr("id", "app"));
    let mut ids = Vec::new();
    for (role, raw) in &input.elements {
        let node = FragmentNode::new("input")
            .attr(role.attribute(), raw.as_str())
            .child(FragmentNode::new("span").attr("data-read", "items.x"));
        ids.push(doc.append(app, node));
    }
    let doc = Rc::new(RefCell::new(doc));
    let registry = EventRegistry::new();
    let state = Value::object([
        ("n", Value::from(1)),
        ("s", Value::from("a")),
        ("items", Value::array(["x", "y"])),
    ]);
    let Ok(controller) = BindingController::builder("#app", state).build(doc.clone(), &registry)
    else {
        return;
    };

    for action in input.actions {
        match action {
            Action::Change { element, text } if !ids.is_empty() => {
                let el = ids[element as usize % ids.len()];
                doc.borrow_mut().set_value(el, &text);
                registry.dispatch(&*doc, &DomEvent::new(EventKind::Change, el));
            }
            Action::Click { element } if !ids.is_empty() => {
                let el = ids[element as usize % ids.len()];
                registry.dispatch(&*doc, &DomEvent::new(EventKind::Click, el));
            }
            Action::Set { path, number } => {
                let _ = controller.state().set_path(&path, i32::from(number));
            }
            Action::Push { text } => {
                if let Ok(items) = controller.state().node("items") {
                    let _ = items.push(text);
                }
            }
            Action::Pop => {
                if let Ok(items) = controller.state().node("items") {
                    let _ = items.pop();
                }
            }
            _ => {}
        }
    }

    // A full pass after any history leaves the document stable.
    controller.apply(None);
    let markup = doc.borrow().to_markup(app);
    controller.apply(None);
    assert_eq!(doc.borrow().to_markup(app), markup);
});
