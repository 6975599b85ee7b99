//! State - コンポーネントの状態と差分
//!
//! - `State`: 常に `loadError` / `handlerError` を含むフィールドの map
//! - `Delta`: 部分的な変更（shallow merge される）
//! - `ErrorSlot`: 失敗を記録するフィールド名

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::HandlerFailure;
use crate::error::AwarenessError;

/// External property snapshot handed to `initial`, `load` and every handler.
pub type Props = Map<String, Value>;

/// The field under which the most recent failure of a handler class is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSlot {
    #[serde(rename = "handlerError")]
    Handler,
    #[serde(rename = "loadError")]
    Load,
}

impl ErrorSlot {
    pub const ALL: [ErrorSlot; 2] = [ErrorSlot::Load, ErrorSlot::Handler];

    pub const fn field(self) -> &'static str {
        match self {
            ErrorSlot::Handler => "handlerError",
            ErrorSlot::Load => "loadError",
        }
    }
}

impl fmt::Display for ErrorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// A partial state object, shallow-merged into the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta(Map<String, Value>);

impl Delta {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// `{ [slot]: failure }`
    pub fn failure(slot: ErrorSlot, failure: &HandlerFailure) -> Self {
        Self::new().with(slot.field(), failure.to_value())
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Delta {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Delta {
    type Error = AwarenessError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(AwarenessError::InvalidDelta(other.to_string())),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Delta {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Component state: field name -> value.
///
/// Always contains `loadError` and `handlerError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    /// `{loadError: null, handlerError: null}` merged with `initial`.
    pub fn seeded(initial: Delta) -> Self {
        let mut fields = Map::new();
        for slot in ErrorSlot::ALL {
            fields.insert(slot.field().to_string(), Value::Null);
        }
        let mut state = Self(fields);
        state.merge(initial);
        state
    }

    /// Shallow merge: top-level fields of `delta` replace those of `self`.
    pub fn merge(&mut self, delta: Delta) {
        for (field, value) in delta.0 {
            self.0.insert(field, value);
        }
    }

    pub fn merged(&self, delta: Delta) -> Self {
        let mut next = self.clone();
        next.merge(delta);
        next
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Decode a field; `None` if missing or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
        self.0
            .get(field)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The failure currently stored in `slot`, if any.
    pub fn error(&self, slot: ErrorSlot) -> Option<HandlerFailure> {
        match self.0.get(slot.field()) {
            None | Some(Value::Null) => None,
            Some(v) => serde_json::from_value(v.clone()).ok(),
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Default for State {
    fn default() -> Self {
        Self::seeded(Delta::new())
    }
}
