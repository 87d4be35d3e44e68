use std::sync::Arc;

use offload_protocol::{ContextEvent, Inbound, Outbound, TransferList};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::link::Link;

/// Error returned when a body posts a reply.
#[derive(Debug, Error)]
pub enum OutboxError {
	/// The context was terminated; nobody is listening any more.
	#[error("context terminated")]
	Closed,
	/// The reply could not be turned into a payload. The context reports a message error.
	#[error("reply could not be serialized: {0}")]
	Serialize(#[from] serde_json::Error),
}

/// Posting half of a context, handed to its body.
#[derive(Clone)]
pub struct Outbox {
	link: Arc<Link>,
}

impl Outbox {
	pub(crate) fn new(link: Arc<Link>) -> Self {
		Self { link }
	}

	/// Posts a ready-made reply message.
	pub fn post_message(&self, message: Outbound) -> Result<(), OutboxError> {
		self.link.emit(ContextEvent::Message(message)).map_err(|_| OutboxError::Closed)
	}

	/// Serializes `value` and posts it as a plain reply, moving `transfer` with it.
	///
	/// Serialization failure raises a message error on the context in addition
	/// to being returned here.
	pub fn post<T: Serialize + ?Sized>(&self, value: &T, transfer: TransferList) -> Result<(), OutboxError> {
		match serde_json::to_value(value) {
			Ok(data) => self.post_message(Outbound::new(data).with_transfer(transfer)),
			Err(err) => {
				tracing::debug!(context = self.link.name(), error = %err, "worker.outbox.serialize_failed");
				let _ = self.link.emit(ContextEvent::MessageError);
				Err(OutboxError::Serialize(err))
			}
		}
	}

	/// Returns `true` once the owning context has been terminated.
	pub fn is_closed(&self) -> bool {
		self.link.is_terminated()
	}
}

impl std::fmt::Debug for Outbox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Outbox").field("context", &self.link.name()).field("closed", &self.is_closed()).finish()
	}
}

/// Everything a body sees of its context: the inbox and the outbox.
pub struct WorkerScope<P> {
	name: Arc<str>,
	inbox: mpsc::UnboundedReceiver<Inbound<P>>,
	outbox: Outbox,
}

impl<P> WorkerScope<P> {
	pub(crate) fn new(name: Arc<str>, inbox: mpsc::UnboundedReceiver<Inbound<P>>, outbox: Outbox) -> Self {
		Self { name, inbox, outbox }
	}

	/// Waits for the next inbound message. Returns `None` once the context is terminated.
	pub async fn recv(&mut self) -> Option<Inbound<P>> {
		self.inbox.recv().await
	}

	/// Returns the posting half.
	pub fn outbox(&self) -> &Outbox {
		&self.outbox
	}

	/// Context name from its [`ContextSpec`](crate::ContextSpec).
	pub fn name(&self) -> &str {
		&self.name
	}
}
