//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects sources (signals,
//! memos, object tracking nodes) with their dependents (memos, effects).
//!
//! # How It Works
//!
//! 1. Memos and effects register with the runtime and keep a handle that
//!    unregisters them on drop.
//!
//! 2. When a source is read inside a reactive context, [`Runtime::track`]
//!    records the current subscriber as a dependent of that source.
//!
//! 3. When a source changes, [`Runtime::notify_signal_change`]:
//!    a. Finds all dependent memos/effects
//!    b. Marks them as "maybe dirty"
//!    c. Runs eager dependents (effects) synchronously
//!    d. Memos are lazy - they recompute on next access
//!
//! No lock is held while dependents run, so a dependent may freely read or
//! write other sources.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use indexmap::IndexSet;
use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::subscriber::{SourceId, SubscriberId};

/// A trait for types that can be notified when dependencies change.
pub trait Reactive: Send + Sync {
    /// Get the subscriber ID for this reactive value.
    fn subscriber_id(&self) -> SubscriberId;

    /// Mark this reactive value as potentially needing update.
    fn mark_maybe_dirty(&self);

    /// Schedule this reactive value for execution (effects only).
    fn schedule(&self);

    /// Check if this reactive value is an effect (eager) or memo (lazy).
    fn is_eager(&self) -> bool;
}

/// Handle to a registered reactive value.
///
/// Dropping this handle unregisters the reactive value from the runtime.
#[derive(Debug)]
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
}

impl ReactiveHandle {
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

/// The global reactive runtime.
pub struct Runtime;

type Registry = RwLock<HashMap<SubscriberId, Weak<dyn Reactive>>>;
type SourceSubscribers = RwLock<HashMap<SourceId, IndexSet<SubscriberId>>>;

// Weak references so the registry never keeps a dependent alive.
static REGISTRY: OnceLock<Registry> = OnceLock::new();
static SOURCE_SUBSCRIBERS: OnceLock<SourceSubscribers> = OnceLock::new();

fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn get_source_subscribers() -> &'static SourceSubscribers {
    SOURCE_SUBSCRIBERS.get_or_init(|| RwLock::new(HashMap::new()))
}

impl Runtime {
    /// Register a reactive value with the runtime.
    ///
    /// Returns a handle that unregisters the value when dropped.
    pub fn register(reactive: Arc<dyn Reactive>) -> ReactiveHandle {
        let id = reactive.subscriber_id();
        get_registry().write().insert(id, Arc::downgrade(&reactive));
        ReactiveHandle { subscriber_id: id }
    }

    fn unregister(id: SubscriberId) {
        get_registry().write().remove(&id);
        Self::clear_dependencies(id);
    }

    /// Record a read of `source` by the current computation, if any.
    ///
    /// This is the "register dependency" half of the capability contract
    /// that signals, memos and object tracking nodes all go through.
    pub fn track(source: SourceId) {
        if let Some(subscriber_id) = ReactiveContext::current_subscriber() {
            ReactiveContext::track_dependency(source);
            Self::add_dependency(source, subscriber_id);
        }
    }

    /// Record that a subscriber depends on a source.
    pub fn add_dependency(source: SourceId, subscriber_id: SubscriberId) {
        get_source_subscribers()
            .write()
            .entry(source)
            .or_default()
            .insert(subscriber_id);
    }

    /// Remove all dependencies for a subscriber.
    ///
    /// Called before re-running a computation to clear stale dependencies.
    pub fn clear_dependencies(subscriber_id: SubscriberId) {
        get_source_subscribers().write().retain(|_, subs| {
            subs.shift_remove(&subscriber_id);
            !subs.is_empty()
        });
    }

    /// Notify all subscribers that a source changed.
    ///
    /// Returns the number of live dependents that were notified.
    pub fn notify_signal_change(source: SourceId) -> usize {
        let subscriber_ids: Vec<SubscriberId> = {
            let subscribers = get_source_subscribers().read();
            match subscribers.get(&source) {
                Some(subs) => subs.iter().copied().collect(),
                None => return 0,
            }
        };

        let dependents: Vec<Arc<dyn Reactive>> = {
            let registry = get_registry().read();
            subscriber_ids
                .iter()
                .filter_map(|id| registry.get(id).and_then(Weak::upgrade))
                .collect()
        };

        tracing::trace!(%source, dependents = dependents.len(), "source changed");

        for reactive in &dependents {
            reactive.mark_maybe_dirty();
        }
        for reactive in &dependents {
            if reactive.is_eager() {
                reactive.schedule();
            }
        }

        dependents.len()
    }

    /// Number of subscribers currently depending on `source`.
    pub fn dependent_count(source: SourceId) -> usize {
        get_source_subscribers()
            .read()
            .get(&source)
            .map_or(0, IndexSet::len)
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a reactive context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}
