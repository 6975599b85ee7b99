//! Errors - handler 側の失敗値
//!
//! HandlerFailure は例外ではなく「状態」として扱われる失敗です。
//! handler / transform / deferred のどこで起きても、最終的には
//! error slot（`handlerError` / `loadError`）に書き込まれます。

use serde::{Deserialize, Serialize};

/// A failure raised by a handler, a transform, or a deferred value.
///
/// Serializes as `{"message": "..."}` so it can be stored in [`State`] and
/// read back with [`State::error`].
///
/// [`State`]: crate::domain::State
/// [`State::error`]: crate::domain::State::error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct HandlerFailure {
    message: String,
}

impl HandlerFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// JSON form stored under an error slot.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::String(self.message.clone()))
    }
}

impl From<&str> for HandlerFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("json decode: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serializes_as_message_object() {
        let v = HandlerFailure::new("Error one").to_value();
        assert_eq!(v, serde_json::json!({ "message": "Error one" }));
    }

    #[test]
    fn failure_reads_back_from_stored_value() {
        let stored = serde_json::json!({ "message": "Error two" });
        let back: HandlerFailure = serde_json::from_value(stored).unwrap();
        assert_eq!(back, HandlerFailure::new("Error two"));
        assert_eq!(back.to_string(), "Error two");
    }

    #[test]
    fn json_errors_convert_with_context() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let failure = HandlerFailure::from(err);
        assert!(failure.message().starts_with("json decode:"));
    }
}
