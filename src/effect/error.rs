//! Errors raised at the boundary between asynchronous readers and the runtime.
//!
//! Readers themselves have no error type: a failing wrapped function fails
//! the run that invoked it. The only failures this crate reports are those
//! of a reader run that was handed to the runtime as a separate task.

use std::any::Any;
use std::error::Error;
use std::fmt;

use tokio::task::JoinError;

/// A reader run spawned with [`AsyncReader::spawn`](super::AsyncReader::spawn)
/// did not produce a value.
///
/// # Examples
///
/// ```rust
/// use reader_kleisli::effect::SpawnError;
///
/// let error = SpawnError::Panicked("boom".to_string());
/// assert_eq!(format!("{error}"), "spawned reader panicked: boom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The task was cancelled before it completed, e.g. because the runtime
    /// shut down.
    Cancelled,

    /// The wrapped function panicked. Carries the panic message when it was a
    /// string.
    Panicked(String),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(formatter, "spawned reader was cancelled"),
            Self::Panicked(message) => write!(formatter, "spawned reader panicked: {message}"),
        }
    }
}

impl Error for SpawnError {}

impl From<JoinError> for SpawnError {
    fn from(error: JoinError) -> Self {
        if !error.is_panic() {
            return Self::Cancelled;
        }
        Self::Panicked(panic_message(error.into_panic().as_ref()))
    }
}

/// Extracts the message of a panic payload raised by `panic!` or `assert!`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
