#![forbid(unsafe_code)]

//! Core data model for Bindery.
//!
//! This crate holds everything that is pure data: the [`Value`] state tree,
//! [`Path`] addressing and resolution, the coercion applied when storing
//! document text into typed leaves, and the [`PathLookup`] read trait the
//! expression engine evaluates against.

pub mod coerce;
pub mod error;
pub mod lookup;
pub mod path;
pub mod value;

pub use coerce::cast;
pub use error::StateError;
pub use lookup::PathLookup;
pub use path::{Path, Segment, is_valid_path};
pub use value::{Map, Value, format_number, parse_float};
