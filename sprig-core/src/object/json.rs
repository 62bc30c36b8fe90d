//! JSON bridge.
//!
//! Facades serialize by reading through the handler, so serializing inside
//! an effect or memo depends on every property it emits. Plain values
//! serialize their raw contents; embedded cells serialize as their current
//! value. Functions and `undefined` members are skipped inside records and
//! become `null` inside arrays.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{ReactiveError, Result};

use super::facade::{Facade, ReactiveValue};
use super::key::PropertyKey;
use super::plain::ObjectRef;
use super::value::Value;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn serialize_number<S: Serializer>(n: f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if !n.is_finite() {
        serializer.serialize_unit()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

fn skipped_in_record(value: &ReactiveValue) -> bool {
    matches!(
        value,
        ReactiveValue::Undefined
            | ReactiveValue::Function(_)
            | ReactiveValue::Untracked(Value::Undefined | Value::Function(_))
    )
}

impl Serialize for Facade {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_array() {
            let length = self
                .get("length")
                .as_number()
                .map_or(0, |n| n as usize);
            let mut seq = serializer.serialize_seq(Some(length))?;
            for index in 0..length {
                seq.serialize_element(&self.get(index))?;
            }
            seq.end()
        } else {
            let names: Vec<PropertyKey> = self
                .keys()
                .into_iter()
                .filter(|key| key.as_name().is_some())
                .collect();
            let mut map = serializer.serialize_map(None)?;
            for key in names {
                let value = self.get(&key);
                if skipped_in_record(&value) {
                    continue;
                }
                if let Some(name) = key.as_name() {
                    map.serialize_entry(name, &value)?;
                }
            }
            map.end()
        }
    }
}

impl Serialize for ReactiveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ReactiveValue::Undefined | ReactiveValue::Null | ReactiveValue::Function(_) => {
                serializer.serialize_unit()
            }
            ReactiveValue::Bool(b) => serializer.serialize_bool(*b),
            ReactiveValue::Number(n) => serialize_number(*n, serializer),
            ReactiveValue::String(s) => serializer.serialize_str(s),
            ReactiveValue::Object(facade) => facade.serialize(serializer),
            ReactiveValue::Untracked(value) => value.serialize(serializer),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serialize_number(*n, serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Object(object) => object.serialize(serializer),
            Value::Cell(cell) => cell.get_untracked().serialize(serializer),
        }
    }
}

impl Serialize for ObjectRef {
    /// Raw serialization; records no dependencies.
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_array() {
            let length = self
                .get_own(&PropertyKey::from("length"))
                .and_then(|v| v.as_number())
                .map_or(0, |n| n as usize);
            let mut seq = serializer.serialize_seq(Some(length))?;
            for index in 0..length {
                seq.serialize_element(&self.get(&PropertyKey::from(index)))?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(None)?;
            for key in self.own_keys() {
                let Some(name) = key.as_name() else { continue };
                let value = self.get(&key);
                let value = match value {
                    Value::Cell(cell) => cell.get_untracked(),
                    other => other,
                };
                if matches!(value, Value::Undefined | Value::Function(_)) {
                    continue;
                }
                map.serialize_entry(name, &value)?;
            }
            map.end()
        }
    }
}

impl Facade {
    /// Snapshot the object as JSON, reading every property through the
    /// facade.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Object(ObjectRef::array(items.into_iter().map(Value::from)))
            }
            serde_json::Value::Object(members) => Value::Object(ObjectRef::record(
                members.into_iter().map(|(k, v)| (k, Value::from(v))),
            )),
        }
    }
}

impl TryFrom<serde_json::Value> for ObjectRef {
    type Error = ReactiveError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        let found = match &json {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => "object",
        };
        match Value::from(json) {
            Value::Object(object) => Ok(object),
            _ => Err(ReactiveError::NotAnObject { found }),
        }
    }
}
