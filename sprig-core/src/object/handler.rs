//! The interception handler.
//!
//! Every facade operation lands here. The handler runs the standard
//! operation on the target object and then, depending on the key and on
//! the shape of the value involved, records a dependency (reads, existence
//! checks, enumeration) or notifies dependents (writes, deletes).
//!
//! Nothing here holds an object or registry lock while dependents run: the
//! standard operation completes first, notifications follow.

use crate::reactive::Runtime;

use super::facade::{wrap, ReactiveValue};
use super::key::PropertyKey;
use super::plain::ObjectRef;
use super::value::{CellKind, Shape, Value};

/// Interposes read/write/delete/has/enumerate on a target object.
#[derive(Debug, Default)]
pub struct ReactiveHandler;

impl ReactiveHandler {
    pub fn new() -> Self {
        Self
    }

    /// Read `key`.
    ///
    /// Meta keys return the raw value untouched. Otherwise embedded cells
    /// are read through (the cell records the dependency), nested objects
    /// come back wrapped, callables pass through untracked, and primitives
    /// are tracked by the property's node.
    pub fn get(&self, target: &ObjectRef, key: &PropertyKey) -> ReactiveValue {
        let raw = target.get(key);
        if key.is_meta() {
            return ReactiveValue::Untracked(raw);
        }

        match raw.shape() {
            Shape::Cell(cell) => ReactiveValue::from_value(cell.get()),
            Shape::NestedObject(object) => {
                // Tracked as a slot so replacing the nested object notifies.
                target.registry().get_or_create(key, raw.clone()).track();
                ReactiveValue::Object(wrap(object.clone()))
            }
            Shape::Callable(callable) => ReactiveValue::Function(callable.clone()),
            Shape::Primitive => {
                target.registry().get_or_create(key, raw.clone()).track();
                ReactiveValue::from_value(raw.clone())
            }
        }
    }

    /// Write `value` to `key`.
    ///
    /// Returns `false` only when the slot holds a derived cell (the write is
    /// dropped) or the standard write refuses the value.
    pub fn set(&self, target: &ObjectRef, key: PropertyKey, value: Value) -> bool {
        let current = target.get(&key);
        if let Shape::Cell(cell) = current.shape() {
            return match cell.kind() {
                CellKind::Writable => cell.set(value),
                CellKind::ReadOnly => {
                    tracing::debug!(%key, "rejected write to derived cell");
                    false
                }
            };
        }

        let becomes_cell = value.is_cell();
        let effects = target.write(key.clone(), value.clone());
        if !effects.ok {
            return false;
        }

        let registry = target.registry();
        if let Some(node) = registry.get(&key) {
            if effects.added {
                // Existence changed even if the value reads the same.
                node.replace(value);
            } else {
                node.set(value);
            }
            if becomes_cell {
                // The cell tracks this slot from now on.
                registry.retire(&key);
            }
        }
        for index in &effects.truncated {
            if let Some(node) = registry.get(index) {
                node.set(Value::Undefined);
            }
        }
        if let Some(length) = effects.length {
            if let Some(node) = registry.get(&PropertyKey::from("length")) {
                node.set(Value::from(length));
            }
        }
        if effects.added || !effects.truncated.is_empty() {
            registry.notify_shape(effects.own_key_count);
        }
        true
    }

    /// Delete `key`, notifying its node (as a transition to `undefined`).
    /// The node itself stays registered.
    pub fn delete(&self, target: &ObjectRef, key: &PropertyKey) -> bool {
        let effects = target.remove(key);
        if !effects.ok {
            return false;
        }

        let registry = target.registry();
        if let Some(node) = registry.get(key) {
            if effects.removed {
                node.replace(Value::Undefined);
            } else {
                node.set(Value::Undefined);
            }
        }
        if effects.removed {
            registry.notify_shape(effects.own_key_count);
        }
        true
    }

    /// Existence check. Non-symbol keys are tracked, so code branching on
    /// presence re-runs when the key is added or removed. A node for a key
    /// never read before is only created inside a tracking computation.
    pub fn has(&self, target: &ObjectRef, key: &PropertyKey) -> bool {
        let result = target.has(key);
        if key.is_symbol() {
            return result;
        }

        let registry = target.registry();
        match registry.get(key) {
            Some(node) => node.track(),
            None if !key.is_meta() && Runtime::is_tracking() => {
                let raw = target.get(key);
                if !raw.is_cell() {
                    registry.get_or_create(key, raw).track();
                }
            }
            None => {}
        }
        result
    }

    /// Own keys. Depends on every tracked property plus the key set itself.
    pub fn own_keys(&self, target: &ObjectRef) -> Vec<PropertyKey> {
        let registry = target.registry();
        for node in registry.nodes() {
            node.track();
        }
        registry.shape(target.own_key_count()).track();
        target.own_keys()
    }
}
