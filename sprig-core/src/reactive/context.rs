//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a source is read,
//! we can register the current computation as a dependent.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing computation.
//! When entering a reactive context (e.g., running a memo or effect), we push
//! the subscriber onto the stack. When the computation completes, we pop it.
//!
//! Nested contexts are supported (a memo that reads from another memo), and
//! [`ReactiveContext::untracked`] pushes a barrier entry so reads inside it
//! are not attributed to the enclosing computation.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::subscriber::{SourceId, SubscriberId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Debug, Clone)]
struct ContextEntry {
    /// The subscriber ID of the current computation, or `None` for an
    /// untracked barrier.
    subscriber_id: Option<SubscriberId>,
    /// Sources read during this computation, in first-read order.
    dependencies: SmallVec<[SourceId; 8]>,
}

/// Guard that pops the context when dropped.
///
/// This keeps the stack balanced even if the computation panics.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given subscriber.
    ///
    /// While this context is active, any sources that are read will
    /// register the subscriber as a dependent.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    fn push(subscriber_id: Option<SubscriberId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber_id,
                dependencies: SmallVec::new(),
            });
        });

        Self { subscriber_id }
    }

    /// Run `f` without attributing its reads to the current computation.
    pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
        let _barrier = Self::push(None);
        f()
    }

    /// Check if there is an active (tracking) reactive context.
    pub fn is_active() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|entry| entry.subscriber_id))
    }

    /// Record a dependency on the given source.
    ///
    /// Repeated reads of the same source are recorded once.
    pub fn track_dependency(source: SourceId) {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if entry.subscriber_id.is_some() && !entry.dependencies.contains(&source) {
                    entry.dependencies.push(source);
                }
            }
        });
    }

    /// Get the dependencies collected in the current context.
    pub fn get_dependencies() -> Vec<SourceId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.to_vec())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, entry.subscriber_id
                );
            }
        });
    }
}
