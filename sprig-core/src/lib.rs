//! Sprig Core
//!
//! This crate provides fine-grained reactive objects: plain data that
//! records which properties a computation reads and notifies exactly the
//! dependents of a property when it is written.
//!
//! It implements:
//!
//! - Reactive primitives (signals, memos, effects)
//! - Per-property tracking nodes, created lazily on first read
//! - Deep reactivity through nested facades
//! - Interop with cells embedded in plain data
//! - A JSON bridge for building and snapshotting objects
//!
//! # Architecture
//!
//! - `reactive`: core reactive primitives and dependency tracking
//! - `object`: plain objects, the interception handler and facades
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use sprig_core::object::{wrap, ObjectRef, Value};
//! use sprig_core::reactive::{Effect, Memo, Signal};
//!
//! let name = Signal::new(Value::from("sprig"));
//! let state = wrap(ObjectRef::record([
//!     ("count", Value::from(1)),
//!     ("name", Value::from(name.clone())),
//! ]));
//!
//! let reader = state.clone();
//! let doubled = Memo::new(move || {
//!     Value::from(reader.get_number("count").unwrap_or(0.0) * 2.0)
//! });
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let (reader, sink) = (state.clone(), log.clone());
//! let _effect = Effect::new(move || {
//!     let name = reader.get_string("name").map(|s| s.to_string()).unwrap_or_default();
//!     sink.lock().push(format!("{name}: {:?}", doubled.get()));
//! });
//!
//! state.set("count", 5);
//! name.set(Value::from("leaf"));
//!
//! assert_eq!(
//!     *log.lock(),
//!     vec!["sprig: 2", "sprig: 10", "leaf: 10"],
//! );
//! ```

pub mod object;
pub mod reactive;

mod error;

pub use error::{ReactiveError, Result};
pub use object::{wrap, Facade, ObjectRef, PropertyKey, ReactiveValue, Value};
