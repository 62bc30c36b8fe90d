//! Memo Implementation
//!
//! A Memo is a cached derived value. It is the read-only kind of reactive
//! cell: there is no `set`, its value is always the result of its
//! computation.
//!
//! # How Memos Work
//!
//! 1. On first access, the memo runs its computation inside a reactive
//!    context and caches the result.
//!
//! 2. When accessed again, if no dependencies have changed, returns the
//!    cached value.
//!
//! 3. When a dependency changes, the runtime marks the memo "maybe dirty".
//!    The memo forwards that notification to its own dependents, so an
//!    effect reading the memo re-runs and pulls the new value.
//!
//! 4. On next access, a dirty memo recomputes.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::{Reactive, ReactiveHandle, Runtime};
use super::subscriber::{SourceId, SubscriberId};

/// Dirty state for a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value is up-to-date.
    Clean,

    /// A dependency might have changed. Need to check.
    MaybeDirty,

    /// The memo definitely needs to recompute.
    Dirty,
}

struct MemoInner<T> {
    /// Source id other computations depend on.
    id: SourceId,

    /// Subscriber id used while the computation runs.
    subscriber_id: SubscriberId,

    compute: Box<dyn Fn() -> T + Send + Sync>,

    /// The cached value (None if never computed).
    value: RwLock<Option<T>>,

    state: RwLock<MemoState>,

    /// Sources read during the last computation.
    dependencies: RwLock<HashSet<SourceId>>,
}

impl<T> MemoInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Move to `state` and forward the change to our dependents if we were
    /// clean. Already-dirty memos have notified once and stay quiet.
    fn invalidate(&self, state: MemoState) {
        let was_clean = {
            let mut current = self.state.write();
            let was_clean = *current == MemoState::Clean;
            if was_clean || state == MemoState::Dirty {
                *current = state;
            }
            was_clean
        };

        if was_clean {
            Runtime::notify_signal_change(self.id);
        }
    }

    fn recompute(&self) -> T {
        Runtime::clear_dependencies(self.subscriber_id);

        let (new_value, new_deps) = {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            let value = (self.compute)();
            (value, ReactiveContext::get_dependencies())
        };

        *self.dependencies.write() = new_deps.into_iter().collect();
        *self.value.write() = Some(new_value.clone());
        *self.state.write() = MemoState::Clean;

        new_value
    }
}

impl<T> Reactive for MemoInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn mark_maybe_dirty(&self) {
        self.invalidate(MemoState::MaybeDirty);
    }

    fn schedule(&self) {}

    fn is_eager(&self) -> bool {
        false
    }
}

/// A cached derived value that recomputes only when dependencies change.
///
/// # Example
///
/// ```rust
/// use sprig_core::reactive::{Memo, Signal};
///
/// let count = Signal::new(2);
/// let source = count.clone();
/// let doubled = Memo::new(move || source.get() * 2);
///
/// assert_eq!(doubled.get(), 4);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<MemoInner<T>>,
    handle: Arc<ReactiveHandle>,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new memo with the given computation function.
    ///
    /// The computation is not run immediately. It runs on first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let inner = Arc::new(MemoInner {
            id: SourceId::new(),
            subscriber_id: SubscriberId::new(),
            compute: Box::new(compute),
            value: RwLock::new(None),
            state: RwLock::new(MemoState::Dirty),
            dependencies: RwLock::new(HashSet::new()),
        });
        let handle = Runtime::register(inner.clone());

        Self {
            inner,
            handle: Arc::new(handle),
        }
    }

    /// Get the memo's source ID.
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Get the subscriber ID for this memo.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.handle.subscriber_id()
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        Runtime::track(self.inner.id);

        if self.state() == MemoState::Clean {
            if let Some(value) = self.inner.value.read().clone() {
                return value;
            }
        }
        self.inner.recompute()
    }

    /// Get the current value without registering a dependency.
    pub fn get_untracked(&self) -> T {
        ReactiveContext::untracked(|| self.get())
    }

    /// Mark the memo as potentially needing recomputation.
    pub fn mark_maybe_dirty(&self) {
        self.inner.invalidate(MemoState::MaybeDirty);
    }

    /// Mark the memo as definitely needing recomputation.
    pub fn mark_dirty(&self) {
        self.inner.invalidate(MemoState::Dirty);
    }

    /// Get the current dirty state.
    pub fn state(&self) -> MemoState {
        *self.inner.state.read()
    }

    /// Number of computations currently depending on this memo.
    pub fn dependent_count(&self) -> usize {
        Runtime::dependent_count(self.inner.id)
    }

    /// Number of sources read by the last computation.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.read().len()
    }

    /// Check if the memo has a cached value.
    pub fn has_value(&self) -> bool {
        self.inner.value.read().is_some()
    }

    /// Whether two handles refer to the same memo.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("has_value", &self.has_value())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn memo_computes_on_first_access() {
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let memo = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert!(!memo.has_value());
        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        assert_eq!(memo.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(memo.has_value());
    }

    #[test]
    fn memo_caches_value_when_clean() {
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let memo = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert_eq!(memo.get(), 42);
        assert_eq!(memo.get(), 42);
        assert_eq!(memo.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn memo_recomputes_when_marked_dirty() {
        let counter = Arc::new(AtomicI32::new(0));
        let counter_clone = counter.clone();

        let memo = Memo::new(move || counter_clone.load(Ordering::SeqCst));

        assert_eq!(memo.get(), 0);

        counter.store(5, Ordering::SeqCst);
        memo.mark_dirty();

        assert_eq!(memo.get(), 5);
    }

    #[test]
    fn memo_follows_signal_automatically() {
        let signal = Signal::new(3);
        let source = signal.clone();
        let memo = Memo::new(move || source.get() + 1);

        assert_eq!(memo.get(), 4);
        assert_eq!(memo.dependency_count(), 1);

        signal.set(10);
        assert_eq!(memo.state(), MemoState::MaybeDirty);
        assert_eq!(memo.get(), 11);
    }

    #[test]
    fn memo_clone_shares_state() {
        let memo1 = Memo::new(|| 42);
        assert_eq!(memo1.get(), 42);

        let memo2 = memo1.clone();
        assert_eq!(memo1.id(), memo2.id());
        assert!(memo2.has_value());
        assert!(memo1.ptr_eq(&memo2));

        memo1.mark_dirty();
        assert_eq!(memo2.state(), MemoState::Dirty);
    }

    #[test]
    fn memo_state_transitions() {
        let memo = Memo::new(|| 42);

        assert_eq!(memo.state(), MemoState::Dirty);

        memo.get();
        assert_eq!(memo.state(), MemoState::Clean);

        memo.mark_maybe_dirty();
        assert_eq!(memo.state(), MemoState::MaybeDirty);

        memo.mark_dirty();
        assert_eq!(memo.state(), MemoState::Dirty);

        memo.get();
        assert_eq!(memo.state(), MemoState::Clean);
    }
}
