//! Reactive Objects
//!
//! Plain objects made reactive at property granularity.
//!
//! # Concepts
//!
//! ## Plain objects
//!
//! [`ObjectRef`] is a shared record or array of [`Value`]s. Values may embed
//! reactive cells ([`Cell`]): a writable [`Signal`](crate::reactive::Signal)
//! or a derived [`Memo`](crate::reactive::Memo).
//!
//! ## Facades
//!
//! [`wrap`] returns a [`Facade`] that intercepts every property operation.
//! A read of a plain property creates (once) and tracks that property's
//! [`TrackingNode`]; a write notifies it. Properties holding a cell
//! delegate to the cell instead and never get a node. Nested objects come
//! back as facades, so reactivity is deep.
//!
//! ## Enumeration
//!
//! Listing keys depends on every tracked property and on a per-object shape
//! node, which is notified whenever a key is added or removed.

mod facade;
mod handler;
mod json;
mod key;
mod plain;
mod registry;
mod value;

pub use facade::{wrap, Facade, ReactiveValue};
pub use handler::ReactiveHandler;
pub use key::{PropertyKey, Symbol, WellKnownSymbol, PROTO_KEY};
pub use plain::{ObjectKind, ObjectRef};
pub use registry::{TrackingNode, TrackingRegistry};
pub use value::{Callable, Cell, CellKind, Shape, Value};
