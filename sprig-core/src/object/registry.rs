//! Tracking nodes and the per-object tracking registry.
//!
//! A [`TrackingNode`] is the reactive identity of one (object, property)
//! pair whose value is not an embedded cell. Nodes are created lazily, the
//! first time a tracked read touches the property, and are stored in the
//! object's own [`TrackingRegistry`]. Because the registry lives inside the
//! object's shared allocation, its nodes are dropped together with the
//! object and every facade over it; nothing needs to be torn down.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::reactive::{Runtime, SourceId};

use super::key::{PropertyKey, Symbol};
use super::value::Value;

struct NodeInner {
    id: SourceId,
    key: PropertyKey,
    /// Last raw value written through the node; diagnostic only.
    value: RwLock<Value>,
}

/// Dependency cell for a single plain property.
#[derive(Clone)]
pub struct TrackingNode(Arc<NodeInner>);

impl TrackingNode {
    fn new(key: PropertyKey, value: Value) -> Self {
        let id = SourceId::new();
        tracing::debug!(%key, node = %id, "creating tracking node");
        Self(Arc::new(NodeInner {
            id,
            key,
            value: RwLock::new(value),
        }))
    }

    pub fn id(&self) -> SourceId {
        self.0.id
    }

    pub fn key(&self) -> &PropertyKey {
        &self.0.key
    }

    /// The last raw value this node saw.
    pub fn value(&self) -> Value {
        self.0.value.read().clone()
    }

    /// Register a dependency on this node in the ambient context.
    pub fn track(&self) {
        Runtime::track(self.0.id);
    }

    /// Store `value` and notify dependents if it differs (SameValue) from
    /// the previous one. Returns whether dependents were notified.
    pub fn set(&self, value: Value) -> bool {
        {
            let mut current = self.0.value.write();
            if current.same_value(&value) {
                return false;
            }
            *current = value;
        }
        Runtime::notify_signal_change(self.0.id);
        true
    }

    /// Store `value` and notify dependents unconditionally.
    pub(crate) fn replace(&self, value: Value) {
        *self.0.value.write() = value;
        Runtime::notify_signal_change(self.0.id);
    }

    /// Number of computations currently depending on this node.
    pub fn dependent_count(&self) -> usize {
        Runtime::dependent_count(self.0.id)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for TrackingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingNode")
            .field("id", &self.0.id)
            .field("key", &self.0.key)
            .field("value", &self.value())
            .finish()
    }
}

/// The tracking nodes of one plain object.
///
/// Holds at most one node per property key, plus a lazily created *shape*
/// node that stands for the object's set of own keys.
#[derive(Default)]
pub struct TrackingRegistry {
    nodes: Mutex<IndexMap<PropertyKey, TrackingNode>>,
    shape: OnceLock<TrackingNode>,
}

impl TrackingRegistry {
    /// Look up the node for `key`, creating it seeded with `initial` when
    /// the property has never been tracked.
    pub fn get_or_create(&self, key: &PropertyKey, initial: Value) -> TrackingNode {
        let mut nodes = self.nodes.lock();
        if let Some(node) = nodes.get(key) {
            return node.clone();
        }
        let node = TrackingNode::new(key.clone(), initial);
        nodes.insert(key.clone(), node.clone());
        node
    }

    pub fn get(&self, key: &PropertyKey) -> Option<TrackingNode> {
        self.nodes.lock().get(key).cloned()
    }

    /// Snapshot of every property node, in creation order.
    pub fn nodes(&self) -> Vec<TrackingNode> {
        self.nodes.lock().values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<PropertyKey> {
        self.nodes.lock().keys().cloned().collect()
    }

    /// Number of property nodes (the shape node is not counted).
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }

    /// Drop the node for `key`. Used when a cell takes over the property.
    pub fn retire(&self, key: &PropertyKey) -> Option<TrackingNode> {
        let node = self.nodes.lock().shift_remove(key);
        if let Some(node) = &node {
            tracing::debug!(%key, node = %node.id(), "retiring tracking node");
        }
        node
    }

    /// The shape node, created on first use with `own_key_count`.
    pub fn shape(&self, own_key_count: usize) -> TrackingNode {
        self.shape
            .get_or_init(|| {
                TrackingNode::new(Symbol::new("ownKeys").into(), Value::from(own_key_count))
            })
            .clone()
    }

    /// The shape node, only if something has enumerated the object.
    pub fn shape_if_tracked(&self) -> Option<TrackingNode> {
        self.shape.get().cloned()
    }

    /// Tell enumeration dependents the own key set changed.
    pub(crate) fn notify_shape(&self, own_key_count: usize) {
        if let Some(shape) = self.shape_if_tracked() {
            shape.replace(Value::from(own_key_count));
        }
    }
}

impl fmt::Debug for TrackingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingRegistry")
            .field("keys", &self.keys())
            .field("shape_tracked", &self.shape.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Effect;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn nodes_are_created_once_per_key() {
        let registry = TrackingRegistry::default();
        let key = PropertyKey::from("count");

        let first = registry.get_or_create(&key, Value::from(1));
        let second = registry.get_or_create(&key, Value::from(99));

        assert!(first.ptr_eq(&second));
        assert_eq!(second.value(), Value::from(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_does_not_create() {
        let registry = TrackingRegistry::default();
        assert!(registry.get(&"missing".into()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn set_notifies_only_on_change() {
        let registry = TrackingRegistry::default();
        let node = registry.get_or_create(&"n".into(), Value::from(1));

        let runs = Arc::new(AtomicUsize::new(0));
        let (tracked, counter) = (node.clone(), runs.clone());
        let _effect = Effect::new(move || {
            tracked.track();
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(node.dependent_count(), 1);

        assert!(!node.set(Value::from(1)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert!(node.set(Value::from(2)));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(node.value(), Value::from(2));
    }

    #[test]
    fn retire_removes_the_node() {
        let registry = TrackingRegistry::default();
        let key = PropertyKey::from("slot");
        registry.get_or_create(&key, Value::Null);

        assert!(registry.retire(&key).is_some());
        assert!(registry.get(&key).is_none());
        assert!(registry.retire(&key).is_none());
    }

    #[test]
    fn shape_node_is_separate() {
        let registry = TrackingRegistry::default();
        assert!(registry.shape_if_tracked().is_none());

        let shape = registry.shape(3);
        assert_eq!(shape.value(), Value::from(3));
        assert!(registry.shape(7).ptr_eq(&shape));
        assert!(registry.is_empty());
    }

    #[test]
    fn shape_notifications_are_unconditional() {
        let registry = Arc::new(TrackingRegistry::default());
        let runs = Arc::new(AtomicUsize::new(0));

        let (tracked, counter) = (registry.clone(), runs.clone());
        let _effect = Effect::new(move || {
            tracked.shape(2).track();
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Same count as before, still a structural change
        registry.notify_shape(2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
