//! Signal Implementation
//!
//! A Signal is the fundamental writable reactive cell. It holds a value and
//! tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read within a reactive context (memo/effect), the
//!    signal registers that context as a dependent through the runtime.
//!
//! 2. When a signal's value changes, local subscribers are called and the
//!    runtime notifies every dependent.
//!
//! 3. Notifications trigger re-execution of dependent effects and mark
//!    dependent memos dirty.
//!
//! Clones share the same cell: same id, same value, same subscribers.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use super::runtime::Runtime;
use super::subscriber::{SourceId, Subscriber, SubscriberId};

/// A reactive signal holding a value of type T.
///
/// # Example
///
/// ```rust
/// use sprig_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// assert_eq!(count.get(), 0);
///
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this signal.
    id: SourceId,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// Callbacks registered with [`Signal::subscribe`].
    subscribers: Arc<RwLock<Vec<Arc<Subscriber>>>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: SourceId::new(),
            value: Arc::new(RwLock::new(value)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Get the current value.
    ///
    /// If called within a reactive context, this also registers the
    /// current computation as a dependent.
    pub fn get(&self) -> T {
        Runtime::track(self.id);
        self.value.read().clone()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.value.read().clone()
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.value.write() = value;

        self.notify_subscribers();
        Runtime::notify_signal_change(self.id);
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&*self.value.read());
        self.set(new_value);
    }

    /// Register a notification callback.
    ///
    /// The callback will be invoked each time the signal is set.
    pub fn subscribe<F>(&self, notify: F) -> SubscriberId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let subscriber = Subscriber::new(notify);
        let id = subscriber.id();
        self.subscribers.write().push(Arc::new(subscriber));
        id
    }

    /// Remove a callback registered with [`Signal::subscribe`].
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id() != subscriber_id);
    }

    fn notify_subscribers(&self) {
        let subscribers: Vec<Arc<Subscriber>> = self.subscribers.read().clone();
        for subscriber in subscribers {
            subscriber.notify();
        }
    }

    /// Number of local callbacks plus runtime dependents.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len() + Runtime::dependent_count(self.id)
    }

    /// Whether two handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn signal_get_and_set() {
        let signal = Signal::new(0);
        assert_eq!(signal.get(), 0);

        signal.set(42);
        assert_eq!(signal.get(), 42);
    }

    #[test]
    fn signal_update() {
        let signal = Signal::new(10);
        signal.update(|v| v + 5);
        assert_eq!(signal.get(), 15);
    }

    #[test]
    fn signal_notifies_subscribers() {
        let signal = Signal::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        signal.subscribe(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        signal.set(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        signal.set(2);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn signal_unsubscribe() {
        let signal = Signal::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let subscriber_id = signal.subscribe(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.set(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        signal.unsubscribe(subscriber_id);
        signal.set(2);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_may_subscribe_during_notification() {
        let signal = Signal::new(0);
        let inner = signal.clone();
        signal.subscribe(move || {
            inner.subscribe(|| {});
        });

        signal.set(1);
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn signal_clone_shares_state() {
        let signal1 = Signal::new(0);
        let signal2 = signal1.clone();

        signal1.set(42);
        assert_eq!(signal2.get(), 42);

        signal2.set(100);
        assert_eq!(signal1.get(), 100);
        assert!(signal1.ptr_eq(&signal2));
    }

    #[test]
    fn signal_ids_are_unique() {
        let s1 = Signal::new(0);
        let s2 = Signal::new(0);

        assert_ne!(s1.id(), s2.id());
        assert!(!s1.ptr_eq(&s2));
    }
}
