//! Error types for registration and dispatch.

use crate::capability::EventKind;

/// Result returned by every capability method.
pub type HandlerResult = Result<(), HandlerError>;

/// Failure reported by a subscriber from inside one of its handlers.
///
/// Returning it from a handler aborts the remaining subscribers of that one
/// dispatch call and surfaces as [`EventError::HandlerFailure`] to the caller.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Free-form failure message
    #[error("{0}")]
    Message(String),
    /// Failure caused by another error
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl HandlerError {
    /// Creates a handler error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wraps an arbitrary error.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}

/// Errors that can occur while registering subscribers or dispatching events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The subscriber implements none of the known handler capabilities
    #[error("Subscriber {subscriber} implements no handler capability")]
    InvalidSubscriber { subscriber: String },
    /// An event kind name or index is not part of the taxonomy
    #[error("Unknown event kind: {0}")]
    UnknownKind(String),
    /// A handler returned an error during dispatch
    #[error("Handler {subscriber} failed during {kind} dispatch: {source}")]
    HandlerFailure {
        kind: EventKind,
        subscriber: String,
        #[source]
        source: HandlerError,
    },
    /// A handler panicked during dispatch
    #[error("Handler {subscriber} panicked during {kind} dispatch: {message}")]
    HandlerPanicked {
        kind: EventKind,
        subscriber: String,
        message: String,
    },
}

impl EventError {
    /// Event kind of the dispatch that failed, if this is a dispatch failure.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Self::HandlerFailure { kind, .. } | Self::HandlerPanicked { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
