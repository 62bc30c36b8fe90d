//! Reactive facades and the wrapper factory.
//!
//! [`wrap`] turns a plain object into a [`Facade`]. Reads through the facade
//! return [`ReactiveValue`], the unwrapped view of a property: embedded
//! cells appear as the value they hold and nested objects appear as
//! facades of their own, so a caller never sees a cell through a facade.

use std::fmt;
use std::sync::Arc;

use crate::error::{ReactiveError, Result};

use super::handler::ReactiveHandler;
use super::key::PropertyKey;
use super::plain::ObjectRef;
use super::registry::TrackingNode;
use super::value::{Callable, Value};

/// Wrap `target` in a new facade.
///
/// Every call allocates a new handler and facade, even for an object that
/// is already wrapped elsewhere. All facades over one object share its data
/// and its tracking nodes; they differ only in identity.
pub fn wrap(target: ObjectRef) -> Facade {
    tracing::trace!(kind = ?target.kind(), "wrapping object");
    Facade {
        target,
        handler: Arc::new(ReactiveHandler::new()),
    }
}

/// A property value as seen through a facade.
#[derive(Clone)]
pub enum ReactiveValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Object(Facade),
    Function(Callable),
    /// A meta-key read, returned exactly as stored.
    Untracked(Value),
}

impl ReactiveValue {
    /// The facade view of a raw value: objects are wrapped, a cell nested
    /// inside a cell is handed back as is.
    pub(crate) fn from_value(value: Value) -> Self {
        match value {
            Value::Undefined => Self::Undefined,
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Object(object) => Self::Object(wrap(object)),
            Value::Function(callable) => Self::Function(callable),
            cell @ Value::Cell(_) => Self::Untracked(cell),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Facade> {
        match self {
            Self::Object(facade) => Some(facade),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Facade> {
        match self {
            Self::Object(facade) => Some(facade),
            _ => None,
        }
    }
}

impl PartialEq for ReactiveValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Untracked(a), Self::Untracked(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ReactiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Object(facade) => write!(f, "{facade:?}"),
            Self::Function(callable) => write!(f, "{callable:?}"),
            Self::Untracked(value) => f.debug_tuple("Untracked").field(value).finish(),
        }
    }
}

impl From<ReactiveValue> for Value {
    /// Facades unwrap to the object they stand for.
    fn from(value: ReactiveValue) -> Self {
        match value {
            ReactiveValue::Undefined => Value::Undefined,
            ReactiveValue::Null => Value::Null,
            ReactiveValue::Bool(b) => Value::Bool(b),
            ReactiveValue::Number(n) => Value::Number(n),
            ReactiveValue::String(s) => Value::String(s),
            ReactiveValue::Object(facade) => Value::Object(facade.target),
            ReactiveValue::Function(callable) => Value::Function(callable),
            ReactiveValue::Untracked(value) => value,
        }
    }
}

impl From<Facade> for Value {
    fn from(facade: Facade) -> Self {
        Value::Object(facade.target)
    }
}

/// A reactive view of a plain object.
///
/// Reading a property records a dependency on exactly that property;
/// writing one notifies exactly its dependents. Cloning a facade copies the
/// reference, not the identity: clones compare equal, separate [`wrap`]
/// calls do not.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use sprig_core::object::{wrap, ObjectRef};
/// use sprig_core::reactive::Effect;
///
/// let data = wrap(ObjectRef::record([("count", 1)]));
/// let runs = Arc::new(AtomicUsize::new(0));
///
/// let (reader, counter) = (data.clone(), runs.clone());
/// let _effect = Effect::new(move || {
///     reader.get("count");
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// data.set("count", 5);
/// assert_eq!(data.get_number("count"), Some(5.0));
/// assert_eq!(runs.load(Ordering::SeqCst), 2);
/// ```
#[derive(Clone)]
pub struct Facade {
    target: ObjectRef,
    handler: Arc<ReactiveHandler>,
}

impl Facade {
    pub fn get(&self, key: impl Into<PropertyKey>) -> ReactiveValue {
        self.handler.get(&self.target, &key.into())
    }

    /// Write a property. Returns `false` when the property is bound to a
    /// derived cell; the stored value is then left unchanged.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> bool {
        self.handler.set(&self.target, key.into(), value.into())
    }

    /// Like [`Facade::set`], but reports a refused write as an error.
    pub fn try_set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if self.handler.set(&self.target, key.clone(), value.into()) {
            Ok(())
        } else {
            Err(ReactiveError::RejectedWrite { key })
        }
    }

    pub fn delete(&self, key: impl Into<PropertyKey>) -> bool {
        self.handler.delete(&self.target, &key.into())
    }

    pub fn has(&self, key: impl Into<PropertyKey>) -> bool {
        self.handler.has(&self.target, &key.into())
    }

    pub fn keys(&self) -> Vec<PropertyKey> {
        self.handler.own_keys(&self.target)
    }

    pub fn get_number(&self, key: impl Into<PropertyKey>) -> Option<f64> {
        self.get(key).as_number()
    }

    pub fn get_string(&self, key: impl Into<PropertyKey>) -> Option<Arc<str>> {
        match self.get(key) {
            ReactiveValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: impl Into<PropertyKey>) -> Option<bool> {
        self.get(key).as_bool()
    }

    pub fn get_object(&self, key: impl Into<PropertyKey>) -> Option<Facade> {
        self.get(key).into_object()
    }

    /// Call the callable stored at `key`. `None` if the slot is not callable.
    pub fn call(&self, key: impl Into<PropertyKey>, args: &[Value]) -> Option<Value> {
        match self.get(key) {
            ReactiveValue::Function(callable) => Some(callable.call(args)),
            _ => None,
        }
    }

    /// The plain object behind this facade.
    pub fn raw(&self) -> &ObjectRef {
        &self.target
    }

    pub fn is_array(&self) -> bool {
        self.target.is_array()
    }

    /// Facade identity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }

    /// Whether both facades view the same plain object.
    pub fn same_target(&self, other: &Self) -> bool {
        self.target.ptr_eq(&other.target)
    }

    /// The tracking node of `key`, if the property has been tracked.
    pub fn tracking_node(&self, key: impl Into<PropertyKey>) -> Option<TrackingNode> {
        self.target.registry().get(&key.into())
    }

    /// Keys with a tracking node, in creation order.
    pub fn tracked_keys(&self) -> Vec<PropertyKey> {
        self.target.registry().keys()
    }
}

impl PartialEq for Facade {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade").field("target", &self.target).finish()
    }
}
