#![forbid(unsafe_code)]

//! Observable state for Bindery.
//!
//! Wraps a [`Value`](bindery_core::Value) tree so that every mutation, at
//! any depth, is reported to subscribers as a fully qualified path plus the
//! old and new values. See [`reactive`] for the contract.

pub mod reactive;

pub use reactive::{Change, Node, ObservableState, Subscription};
