//! Plain objects and their standard (untracked) operations.
//!
//! An [`ObjectRef`] is a shared handle to a record or array. Its methods
//! implement the plain language-level semantics of property access, with
//! no dependency tracking at all; facades layer tracking on top of them.
//!
//! Semantics:
//! - reads and existence checks fall through to the prototype link,
//!   writes and deletes act on own properties;
//! - `__proto__` reads and writes the prototype link itself;
//! - arrays expose a virtual `length`, grow when an index at or past it is
//!   written, and drop trailing indices when `length` is lowered.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::key::PropertyKey;
use super::registry::TrackingRegistry;
use super::value::Value;

const LENGTH_KEY: &str = "length";

/// Whether an object is a plain record or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Record,
    Array,
}

struct PlainObject {
    kind: ObjectKind,
    properties: IndexMap<PropertyKey, Value>,
    /// Only meaningful for arrays.
    length: usize,
    prototype: Option<ObjectRef>,
}

impl PlainObject {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            length: 0,
            prototype: None,
        }
    }

    fn is_length(&self, key: &PropertyKey) -> bool {
        self.kind == ObjectKind::Array && key.as_name() == Some(LENGTH_KEY)
    }

    fn own_key_count(&self) -> usize {
        self.properties.len() + usize::from(self.kind == ObjectKind::Array)
    }
}

pub(crate) struct ObjectData {
    object: RwLock<PlainObject>,
    registry: TrackingRegistry,
}

/// What a standard write changed, beyond the written slot itself.
#[derive(Debug, Default)]
pub(crate) struct WriteEffects {
    /// The write succeeded.
    pub ok: bool,
    /// The key was not an own property before.
    pub added: bool,
    /// Array indices removed by shrinking `length`.
    pub truncated: Vec<PropertyKey>,
    /// New array length, if it changed.
    pub length: Option<usize>,
    /// Own key count after the write.
    pub own_key_count: usize,
}

/// What a standard delete changed.
#[derive(Debug, Default)]
pub(crate) struct DeleteEffects {
    /// The deletion outcome reported to the caller.
    pub ok: bool,
    /// An own property was actually removed.
    pub removed: bool,
    /// Own key count after the delete.
    pub own_key_count: usize,
}

/// Shared handle to a plain object.
///
/// Cloning the handle does not copy the object; equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
    fn with_kind(kind: ObjectKind) -> Self {
        Self(Arc::new(ObjectData {
            object: RwLock::new(PlainObject::new(kind)),
            registry: TrackingRegistry::default(),
        }))
    }

    /// An empty record.
    pub fn new_record() -> Self {
        Self::with_kind(ObjectKind::Record)
    }

    /// An empty array.
    pub fn new_array() -> Self {
        Self::with_kind(ObjectKind::Array)
    }

    /// A record holding `entries` in order.
    pub fn record<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        let object = Self::new_record();
        for (key, value) in entries {
            object.set(key, value);
        }
        object
    }

    /// An array holding `elements` at indices `0..n`.
    pub fn array<V: Into<Value>>(elements: impl IntoIterator<Item = V>) -> Self {
        let object = Self::new_array();
        for (index, value) in elements.into_iter().enumerate() {
            object.set(index, value);
        }
        object
    }

    pub fn kind(&self) -> ObjectKind {
        self.0.object.read().kind
    }

    pub fn is_array(&self) -> bool {
        self.kind() == ObjectKind::Array
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn registry(&self) -> &TrackingRegistry {
        &self.0.registry
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.object.read().prototype.clone()
    }

    pub fn set_prototype(&self, prototype: Option<ObjectRef>) {
        self.0.object.write().prototype = prototype;
    }

    /// The own property `key`, without consulting the prototype.
    pub fn get_own(&self, key: &PropertyKey) -> Option<Value> {
        let object = self.0.object.read();
        if object.is_length(key) {
            return Some(Value::from(object.length));
        }
        object.properties.get(key).cloned()
    }

    /// Standard read: own property, then the prototype chain; `undefined`
    /// when absent everywhere.
    pub fn get(&self, key: &PropertyKey) -> Value {
        if key.is_proto() {
            return self.prototype().map_or(Value::Null, Value::Object);
        }

        let mut current = self.clone();
        loop {
            if let Some(value) = current.get_own(key) {
                return value;
            }
            match current.prototype() {
                Some(next) => current = next,
                None => return Value::Undefined,
            }
        }
    }

    /// Standard existence check: own property or anywhere on the prototype
    /// chain.
    pub fn has(&self, key: &PropertyKey) -> bool {
        let mut current = self.clone();
        loop {
            if current.has_own(key) {
                return true;
            }
            match current.prototype() {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    pub fn has_own(&self, key: &PropertyKey) -> bool {
        let object = self.0.object.read();
        object.is_length(key) || object.properties.contains_key(key)
    }

    /// Standard write. Returns `false` if the write is refused (an invalid
    /// array length).
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> bool {
        self.write(key.into(), value.into()).ok
    }

    pub(crate) fn write(&self, key: PropertyKey, value: Value) -> WriteEffects {
        if key.is_proto() {
            match value {
                Value::Object(prototype) => self.set_prototype(Some(prototype)),
                Value::Null => self.set_prototype(None),
                _ => {}
            }
            return WriteEffects {
                ok: true,
                own_key_count: self.own_key_count(),
                ..WriteEffects::default()
            };
        }

        let mut object = self.0.object.write();
        let mut effects = WriteEffects {
            ok: true,
            ..WriteEffects::default()
        };

        if object.is_length(&key) {
            let Some(new_length) = value.as_number().and_then(valid_length) else {
                effects.ok = false;
                effects.own_key_count = object.own_key_count();
                return effects;
            };
            if new_length < object.length {
                let old = std::mem::take(&mut object.properties);
                let (kept, removed): (IndexMap<_, _>, IndexMap<_, _>) = old
                    .into_iter()
                    .partition(|(k, _)| k.array_index().map_or(true, |i| i < new_length));
                object.properties = kept;
                effects.truncated = removed.into_keys().collect();
            }
            if new_length != object.length {
                object.length = new_length;
                effects.length = Some(new_length);
            }
        } else {
            if object.kind == ObjectKind::Array {
                if let Some(index) = key.array_index() {
                    if index >= object.length {
                        object.length = index + 1;
                        effects.length = Some(object.length);
                    }
                }
            }
            effects.added = object.properties.insert(key, value).is_none();
        }

        effects.own_key_count = object.own_key_count();
        effects
    }

    /// Standard delete. Deleting an absent key succeeds; an array's
    /// `length` cannot be deleted.
    pub fn delete(&self, key: &PropertyKey) -> bool {
        self.remove(key).ok
    }

    pub(crate) fn remove(&self, key: &PropertyKey) -> DeleteEffects {
        let mut object = self.0.object.write();
        if object.is_length(key) {
            return DeleteEffects {
                ok: false,
                removed: false,
                own_key_count: object.own_key_count(),
            };
        }
        let removed = object.properties.shift_remove(key).is_some();
        DeleteEffects {
            ok: true,
            removed,
            own_key_count: object.own_key_count(),
        }
    }

    /// Own keys: array indices ascending, then `length` for arrays, then
    /// other names in insertion order, then symbols in insertion order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let object = self.0.object.read();

        let mut indices: Vec<(usize, &PropertyKey)> = object
            .properties
            .keys()
            .filter_map(|k| k.array_index().map(|i| (i, k)))
            .collect();
        indices.sort_unstable_by_key(|(i, _)| *i);

        let mut keys: Vec<PropertyKey> = indices.into_iter().map(|(_, k)| k.clone()).collect();
        if object.kind == ObjectKind::Array {
            keys.push(PropertyKey::from(LENGTH_KEY));
        }
        keys.extend(
            object
                .properties
                .keys()
                .filter(|k| !k.is_symbol() && k.array_index().is_none())
                .cloned(),
        );
        keys.extend(object.properties.keys().filter(|k| k.is_symbol()).cloned());
        keys
    }

    pub fn own_key_count(&self) -> usize {
        self.0.object.read().own_key_count()
    }
}

/// A valid array length: a non-negative integer.
fn valid_length(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64).then_some(n as usize)
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shallow on purpose: object graphs may be cyclic.
        let object = self.0.object.read();
        f.debug_struct("ObjectRef")
            .field("kind", &object.kind)
            .field("keys", &object.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}
