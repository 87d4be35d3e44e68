//! Messages crossing the boundary and the resources moved alongside them.

use std::ops::Deref;

use bytes::Bytes;
use serde_json::Value;

/// Owned resource moved, not copied, across the boundary with a message.
///
/// The sending side gives up its [`TransferList`] by value when posting; the
/// receiving side becomes the exclusive owner of the buffers it carries.
#[derive(Debug, PartialEq, Eq)]
pub struct Transferable(Bytes);

impl Transferable {
	/// Wraps a buffer for transfer.
	pub fn new(buf: impl Into<Bytes>) -> Self {
		Self(buf.into())
	}

	/// Takes the transferred buffer.
	pub fn into_bytes(self) -> Bytes {
		self.0
	}
}

impl From<Bytes> for Transferable {
	fn from(buf: Bytes) -> Self {
		Self(buf)
	}
}

impl From<Vec<u8>> for Transferable {
	fn from(buf: Vec<u8>) -> Self {
		Self(Bytes::from(buf))
	}
}

impl Deref for Transferable {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

/// Resources moved with one message. Empty unless a transfer selector is set.
pub type TransferList = Vec<Transferable>;

/// Input message posted into an isolated context. The data is opaque to the protocol.
#[derive(Debug)]
pub struct Inbound<P> {
	/// Raw input value.
	pub data: P,
	/// Resources moved with the input.
	pub transfer: TransferList,
}

impl<P> Inbound<P> {
	/// Creates an inbound message with no transferred resources.
	pub fn new(data: P) -> Self {
		Self { data, transfer: Vec::new() }
	}

	/// Attaches a transfer list.
	#[must_use]
	pub fn with_transfer(mut self, transfer: TransferList) -> Self {
		self.transfer = transfer;
		self
	}
}

/// Reply message posted out of an isolated context: an envelope or a plain value.
#[derive(Debug, PartialEq)]
pub struct Outbound {
	/// Reply payload in the JSON data model.
	pub data: Value,
	/// Resources moved with the reply.
	pub transfer: TransferList,
}

impl Outbound {
	/// Creates an outbound message with no transferred resources.
	pub fn new(data: Value) -> Self {
		Self { data, transfer: Vec::new() }
	}

	/// Attaches a transfer list.
	#[must_use]
	pub fn with_transfer(mut self, transfer: TransferList) -> Self {
		self.transfer = transfer;
		self
	}
}
