//! Error types.
//!
//! Property operations on a facade are total except for writes to a derived
//! slot. `Facade::set` reports that as `false`, matching plain property-write
//! semantics; `Facade::try_set` surfaces it as [`ReactiveError::RejectedWrite`].

use thiserror::Error;

use crate::object::PropertyKey;

#[derive(Debug, Error)]
pub enum ReactiveError {
    #[error("cannot assign to `{key}`: the property is bound to a derived cell")]
    RejectedWrite { key: PropertyKey },

    #[error("expected a JSON object or array, found {found}")]
    NotAnObject { found: &'static str },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReactiveError>;
