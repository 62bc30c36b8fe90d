//! Reactive Primitives
//!
//! This module implements the reactive cells and the dependency-tracking
//! machinery that reactive objects build on.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a writable container for state. When a signal's value is read
//! within a tracking context (such as a memo or effect), the signal
//! registers that context as a dependent. When the signal's value changes,
//! all dependents are notified.
//!
//! ## Memos
//!
//! A Memo is a derived, read-only value that caches its result. It
//! re-evaluates only when one of its dependencies changes.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that re-runs whenever its
//! dependencies change.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local tracking context to detect
//! dependencies automatically. Anything that can be read is a *source*
//! identified by a [`SourceId`]; [`Runtime::track`] records a read and
//! [`Runtime::notify_signal_change`] delivers a write. Reactive objects use
//! exactly these two calls for their per-property tracking nodes.

mod context;
mod effect;
mod memo;
mod runtime;
mod signal;
mod subscriber;

pub use context::ReactiveContext;
pub use effect::Effect;
pub use memo::{Memo, MemoState};
pub use runtime::{Reactive, ReactiveHandle, Runtime};
pub use signal::Signal;
pub use subscriber::{SourceId, Subscriber, SubscriberId};
