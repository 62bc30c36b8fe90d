//! Property keys.
//!
//! A key is either a name (which also covers array indices, stored in their
//! canonical decimal form) or a symbol. Well-known symbols and the
//! prototype-link key are *meta* keys: reads through a facade never track
//! them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The key that reads and writes an object's prototype link.
pub const PROTO_KEY: &str = "__proto__";

/// Largest array index; one below the largest array length (`2^32 - 1`).
pub const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

/// Language-level symbols that object machinery looks up on any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSymbol {
    AsyncIterator,
    HasInstance,
    IsConcatSpreadable,
    Iterator,
    Match,
    MatchAll,
    Replace,
    Search,
    Species,
    Split,
    ToPrimitive,
    ToStringTag,
    Unscopables,
}

impl WellKnownSymbol {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AsyncIterator => "asyncIterator",
            Self::HasInstance => "hasInstance",
            Self::IsConcatSpreadable => "isConcatSpreadable",
            Self::Iterator => "iterator",
            Self::Match => "match",
            Self::MatchAll => "matchAll",
            Self::Replace => "replace",
            Self::Search => "search",
            Self::Species => "species",
            Self::Split => "split",
            Self::ToPrimitive => "toPrimitive",
            Self::ToStringTag => "toStringTag",
            Self::Unscopables => "unscopables",
        }
    }
}

/// A symbol key: either well-known or a unique local symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    WellKnown(WellKnownSymbol),
    Local { id: u64, description: Arc<str> },
}

impl Symbol {
    /// Create a fresh symbol, distinct from every other symbol.
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self::Local {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    pub fn is_well_known(&self) -> bool {
        matches!(self, Self::WellKnown(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WellKnown(s) => write!(f, "Symbol.{}", s.name()),
            Self::Local { description, .. } => write!(f, "Symbol({description})"),
        }
    }
}

/// A property key of a plain object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Name(Arc<str>),
    Symbol(Symbol),
}

impl PropertyKey {
    /// Well-known symbols and `__proto__`; these bypass all tracking on read.
    pub fn is_meta(&self) -> bool {
        match self {
            Self::Name(name) => &**name == PROTO_KEY,
            Self::Symbol(symbol) => symbol.is_well_known(),
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    pub fn is_proto(&self) -> bool {
        matches!(self, Self::Name(name) if &**name == PROTO_KEY)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_ref()),
            Self::Symbol(_) => None,
        }
    }

    /// The array index this key denotes, if it is a canonical index
    /// (`"0"`, `"17"`, but not `"01"`, `"+1"` or `"-1"`) no greater than
    /// [`MAX_ARRAY_INDEX`]. Larger digit strings are plain names.
    pub fn array_index(&self) -> Option<usize> {
        let name = self.as_name()?;
        let canonical = !name.is_empty()
            && name.bytes().all(|b| b.is_ascii_digit())
            && (name == "0" || !name.starts_with('0'));
        if !canonical {
            return None;
        }
        name.parse::<u64>()
            .ok()
            .filter(|&index| index <= MAX_ARRAY_INDEX)
            .and_then(|index| usize::try_from(index).ok())
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        Self::Name(name.into())
    }
}

impl From<&String> for PropertyKey {
    fn from(name: &String) -> Self {
        Self::Name(name.as_str().into())
    }
}

impl From<Arc<str>> for PropertyKey {
    fn from(name: Arc<str>) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        Self::Name(index.to_string().into())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<WellKnownSymbol> for PropertyKey {
    fn from(symbol: WellKnownSymbol) -> Self {
        Self::Symbol(Symbol::WellKnown(symbol))
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}
