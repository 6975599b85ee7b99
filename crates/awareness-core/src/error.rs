use thiserror::Error;

use crate::domain::HandlerFailure;

/// Engine-level errors: component wiring and handler lookup.
///
/// Failures raised by handlers are never reported through this type; they
/// are stored in state under an error slot.
#[derive(Debug, Error)]
pub enum AwarenessError {
    #[error("handler not found: {0}")]
    UnknownHandler(String),

    #[error("duplicate handler: {0}")]
    DuplicateHandler(String),

    #[error("handler name '{0}' is reserved; use the dedicated builder method")]
    ReservedName(String),

    #[error("an `initial` state function is required")]
    MissingInitial,

    #[error("no tokio runtime available to drive deferred state changers")]
    NoRuntime,

    #[error("delta must be a JSON object, got {0}")]
    InvalidDelta(String),
}

/// Lets a handler propagate a failed sibling lookup with `?`.
impl From<AwarenessError> for HandlerFailure {
    fn from(err: AwarenessError) -> Self {
        HandlerFailure::new(err.to_string())
    }
}
