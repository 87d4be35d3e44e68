//! The isolated execution context seam.
//!
//! An [`IsolatedContext`] is a single-use bidirectional channel with lifecycle
//! `spawned -> active -> terminated`. The orchestrating side arms one
//! [`ContextListener`], posts one [`Inbound`] message and terminates the context
//! once the first event has been observed.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::message::{Inbound, Outbound};

/// Event delivered by an isolated context to its listener.
#[derive(Debug)]
pub enum ContextEvent {
	/// The context posted a reply.
	Message(Outbound),
	/// The execution environment itself faulted. Unrelated to handler failures.
	Fault(Option<String>),
	/// The context posted a reply that could not be turned into a payload.
	MessageError,
}

impl ContextEvent {
	/// Short event label for logs.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Message(_) => "message",
			Self::Fault(_) => "fault",
			Self::MessageError => "message_error",
		}
	}
}

type DeliverFn = dyn Fn(ContextEvent) -> bool + Send + Sync;

/// Cloneable event sink installed into a context by [`IsolatedContext::arm`].
///
/// Each delivery reports whether the event was accepted. Once the receiving
/// side has settled, every further delivery is refused.
#[derive(Clone)]
pub struct ContextListener {
	deliver: Arc<DeliverFn>,
}

impl ContextListener {
	/// Creates a listener from a delivery function.
	pub fn new(deliver: impl Fn(ContextEvent) -> bool + Send + Sync + 'static) -> Self {
		Self { deliver: Arc::new(deliver) }
	}

	/// Delivers one event.
	pub fn deliver(&self, event: ContextEvent) -> bool {
		(self.deliver)(event)
	}

	/// Delivers a reply message.
	pub fn message(&self, message: Outbound) -> bool {
		self.deliver(ContextEvent::Message(message))
	}

	/// Delivers an execution environment fault.
	pub fn fault(&self, message: Option<String>) -> bool {
		self.deliver(ContextEvent::Fault(message))
	}

	/// Delivers a reply that could not be deserialized.
	pub fn message_error(&self) -> bool {
		self.deliver(ContextEvent::MessageError)
	}
}

impl fmt::Debug for ContextListener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextListener").finish_non_exhaustive()
	}
}

/// Error returned by [`IsolatedContext::post`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextFault {
	/// The context's inbox is gone.
	#[error("context inbox closed")]
	Closed,
	/// The context was already terminated.
	#[error("context terminated")]
	Terminated,
}

/// Single-use isolated execution context, exclusively owned by one invocation.
pub trait IsolatedContext: Send {
	/// Input type accepted by [`IsolatedContext::post`].
	type Input: Send + 'static;

	/// Installs the event listener. Called once, before any message is posted.
	fn arm(&mut self, listener: ContextListener);

	/// Transmits the input, moving its transfer list into the context.
	fn post(&mut self, message: Inbound<Self::Input>) -> Result<(), ContextFault>;

	/// Forcibly destroys the execution environment. Calls after the first are no-ops,
	/// and a terminated context never delivers further events.
	fn terminate(&mut self);
}

impl<C: IsolatedContext + ?Sized> IsolatedContext for Box<C> {
	type Input = C::Input;

	fn arm(&mut self, listener: ContextListener) {
		(**self).arm(listener);
	}

	fn post(&mut self, message: Inbound<Self::Input>) -> Result<(), ContextFault> {
		(**self).post(message)
	}

	fn terminate(&mut self) {
		(**self).terminate();
	}
}
