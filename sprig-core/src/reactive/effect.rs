//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency changes, the runtime schedules the effect and it
//!    re-runs synchronously, before the write that triggered it returns.
//!
//! 3. Before re-running, the effect clears its old dependencies and tracks
//!    new ones during execution.
//!
//! # Differences from Memo
//!
//! - Memos return a value; effects do not.
//! - Memos are lazy (compute on access); effects are eager (run when deps change).
//! - Memos cache results; effects just run their side effect.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::{Reactive, ReactiveHandle, Runtime};
use super::subscriber::{SourceId, SubscriberId};

struct EffectInner {
    subscriber_id: SubscriberId,

    run: Box<dyn Fn() + Send + Sync>,

    /// Sources read during the last run.
    dependencies: RwLock<HashSet<SourceId>>,

    disposed: AtomicBool,

    /// Set while `run` executes; a schedule arriving then is dropped.
    running: AtomicBool,

    run_count: AtomicUsize,
}

/// Clears the running flag when a run ends, including by unwinding.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.load(Ordering::SeqCst) || self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let _running = RunningGuard(&self.running);

        Runtime::clear_dependencies(self.subscriber_id);

        let new_deps = {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            (self.run)();
            ReactiveContext::get_dependencies()
        };

        *self.dependencies.write() = new_deps.into_iter().collect();
        self.run_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl Reactive for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn mark_maybe_dirty(&self) {}

    fn schedule(&self) {
        self.execute();
    }

    fn is_eager(&self) -> bool {
        true
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// Dropping every handle to the effect unregisters it; keep the handle alive
/// for as long as the effect should react.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
/// use sprig_core::reactive::{Effect, Signal};
///
/// let count = Signal::new(0);
/// let seen = Arc::new(AtomicI32::new(-1));
///
/// let (source, sink) = (count.clone(), seen.clone());
/// let _effect = Effect::new(move || sink.store(source.get(), Ordering::SeqCst));
///
/// count.set(5);
/// assert_eq!(seen.load(Ordering::SeqCst), 5);
/// ```
pub struct Effect {
    inner: Arc<EffectInner>,
    handle: Arc<ReactiveHandle>,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let effect = Self::new_lazy(run);
        effect.execute();
        effect
    }

    /// Create a new effect without running it immediately.
    ///
    /// It reacts to nothing until the first [`Effect::execute`].
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new(EffectInner {
            subscriber_id: SubscriberId::new(),
            run: Box::new(run),
            dependencies: RwLock::new(HashSet::new()),
            disposed: AtomicBool::new(false),
            running: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
        });
        let handle = Runtime::register(inner.clone());

        Self {
            inner,
            handle: Arc::new(handle),
        }
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.handle.subscriber_id()
    }

    /// Execute the effect function, re-collecting its dependencies.
    pub fn execute(&self) {
        self.inner.execute();
    }

    /// Schedule the effect to re-run.
    pub fn schedule(&self) {
        self.inner.schedule();
    }

    /// Dispose of the effect.
    ///
    /// After disposal, the effect will not run again.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        Runtime::clear_dependencies(self.inner.subscriber_id);
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Get the number of sources read by the last run.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.read().len()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
