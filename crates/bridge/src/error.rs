//! Invocation error taxonomy.

use thiserror::Error;

/// Description used when a context faults without a message.
pub const DEFAULT_CONTEXT_ERROR: &str = "context error";

/// Why an invocation was rejected. None of these are retried by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvokeError {
	/// The cancellation token fired before a reply was honored.
	#[error("worker aborted")]
	Aborted,

	/// The handler failed; carries its description verbatim.
	#[error("{0}")]
	HandlerFailure(String),

	/// The execution environment itself faulted.
	#[error("{0}")]
	ContextFailure(String),

	/// The reply could not be read as an envelope or as the expected result.
	#[error("worker message could not be deserialized")]
	DeserializationFailure,
}

impl InvokeError {
	/// Builds a context failure, falling back to [`DEFAULT_CONTEXT_ERROR`] for missing or empty messages.
	pub fn context(message: Option<String>) -> Self {
		match message {
			Some(message) if !message.is_empty() => Self::ContextFailure(message),
			_ => Self::ContextFailure(DEFAULT_CONTEXT_ERROR.to_string()),
		}
	}

	/// Returns `true` for [`InvokeError::Aborted`].
	pub const fn is_aborted(&self) -> bool {
		matches!(self, Self::Aborted)
	}
}

/// Settled result of one invocation.
pub type Outcome<R> = Result<R, InvokeError>;
