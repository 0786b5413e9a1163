//! Per-slot failure captured during a collecting emission

use std::any::Any;

use thiserror::Error;

/// The outcome of invoking a single slot under the collecting policy.
pub type SlotResult<R> = Result<R, SlotError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// The bound method panicked. Carries the panic message when it was a string.
    #[error("slot callback panicked: {0}")]
    Panicked(String),

    /// The listener was dropped by an earlier slot of the same emission.
    #[error("slot listener was dropped before it could be called")]
    Expired,
}

impl SlotError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        };
        SlotError::Panicked(message)
    }
}
