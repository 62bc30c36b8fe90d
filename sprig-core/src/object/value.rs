//! The value model of plain objects.
//!
//! Every property of a plain object holds a [`Value`]. What the interception
//! handler does with a property depends only on the value's [`Shape`]:
//! embedded cells are delegated to, nested objects are wrapped, callables
//! pass through, and primitives are tracked by a node.

use std::fmt;
use std::sync::Arc;

use crate::reactive::{Memo, Signal, SourceId};

use super::plain::ObjectRef;

/// A callable property value.
///
/// Callables never take part in dependency tracking; reading one through a
/// facade returns it unchanged.
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// Whether an embedded cell accepts writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Writable,
    ReadOnly,
}

/// A reactive cell embedded as a property value.
///
/// Objects never create cells; they only detect and delegate to the ones
/// callers put in them.
#[derive(Clone, Debug)]
pub enum Cell {
    Writable(Signal<Value>),
    Derived(Memo<Value>),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Writable(_) => CellKind::Writable,
            Self::Derived(_) => CellKind::ReadOnly,
        }
    }

    pub fn id(&self) -> SourceId {
        match self {
            Self::Writable(signal) => signal.id(),
            Self::Derived(memo) => memo.id(),
        }
    }

    /// Read the cell, recording a dependency in the ambient context.
    pub fn get(&self) -> Value {
        match self {
            Self::Writable(signal) => signal.get(),
            Self::Derived(memo) => memo.get(),
        }
    }

    pub fn get_untracked(&self) -> Value {
        match self {
            Self::Writable(signal) => signal.get_untracked(),
            Self::Derived(memo) => memo.get_untracked(),
        }
    }

    /// Write through the cell. Derived cells refuse and return `false`.
    pub fn set(&self, value: Value) -> bool {
        match self {
            Self::Writable(signal) => {
                signal.set(value);
                true
            }
            Self::Derived(_) => false,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Writable(a), Self::Writable(b)) => a.ptr_eq(b),
            (Self::Derived(a), Self::Derived(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// The runtime shape of a value, which decides how a facade treats it.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Cell(&'a Cell),
    NestedObject(&'a ObjectRef),
    Callable(&'a Callable),
    Primitive,
}

/// Anything a plain object property can hold.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Object(ObjectRef),
    Function(Callable),
    Cell(Cell),
}

impl Value {
    pub fn shape(&self) -> Shape<'_> {
        match self {
            Self::Cell(cell) => Shape::Cell(cell),
            Self::Object(object) => Shape::NestedObject(object),
            Self::Function(callable) => Shape::Callable(callable),
            _ => Shape::Primitive,
        }
    }

    /// Build a record from `(key, value)` pairs.
    pub fn record<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<super::PropertyKey>,
        V: Into<Value>,
    {
        Self::Object(ObjectRef::record(entries))
    }

    /// Build an array from its elements.
    pub fn array<V: Into<Value>>(elements: impl IntoIterator<Item = V>) -> Self {
        Self::Object(ObjectRef::array(elements))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Self::Cell(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Object(object) if object.is_array() => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Cell(_) => "cell",
        }
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

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// SameValue equality: `NaN` equals itself and `+0` differs from `-0`.
    /// Objects, callables and cells compare by identity.
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Cell(a), Self::Cell(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Object(object) => write!(f, "{object:?}"),
            Self::Function(callable) => write!(f, "{callable:?}"),
            Self::Cell(cell) => write!(f, "{cell:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Self::Object(object)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Self::Function(callable)
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        Self::Cell(cell)
    }
}

impl From<Signal<Value>> for Value {
    fn from(signal: Signal<Value>) -> Self {
        Self::Cell(Cell::Writable(signal))
    }
}

impl From<Memo<Value>> for Value {
    fn from(memo: Memo<Value>) -> Self {
        Self::Cell(Cell::Derived(memo))
    }
}
