#![no_main]

use bindery_core::{Path, PathLookup, StateError, Value, is_valid_path};
use bindery_runtime::ObservableState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let valid = is_valid_path(raw);
    assert_eq!(Path::parse(raw).is_ok(), valid);
    if let Ok(path) = Path::parse(raw) {
        // Display round-trips through the parser.
        assert_eq!(Path::parse(&path.to_string()).ok(), Some(path));
    }

    let state = ObservableState::new(Value::object([
        ("a", Value::object([("b", Value::array([1, 2]))])),
        ("s", Value::from("text")),
    ]));
    let before = state.snapshot();
    match state.store(raw, Value::from("7")) {
        Err(StateError::InvalidPath(_)) => {
            assert!(!valid);
            assert_eq!(state.snapshot(), before);
        }
        Err(_) => assert_eq!(state.snapshot(), before),
        Ok(_) => assert!(state.path_exists(raw)),
    }
});
