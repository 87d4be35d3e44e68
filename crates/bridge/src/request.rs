//! One invocation's input, cancellation token and context factory.

use offload_protocol::{IsolatedContext, TransferList};
use tokio_util::sync::CancellationToken;

type Factory<C> = Box<dyn FnOnce() -> C + Send>;
type TransferSelector<P> = Box<dyn FnOnce(&P) -> TransferList + Send>;

/// Input for a single [`invoke`](crate::invoke) call. Built fresh per invocation and consumed by it.
pub struct Request<C: IsolatedContext> {
	pub(crate) input: C::Input,
	pub(crate) cancel: CancellationToken,
	pub(crate) factory: Factory<C>,
	pub(crate) transfer: Option<TransferSelector<C::Input>>,
}

impl<C: IsolatedContext> Request<C> {
	/// Creates a request. `factory` is called exactly once to produce the context.
	pub fn new(input: C::Input, cancel: CancellationToken, factory: impl FnOnce() -> C + Send + 'static) -> Self {
		Self {
			input,
			cancel,
			factory: Box::new(factory),
			transfer: None,
		}
	}

	/// Derives the resources moved with the input. Without a selector the transfer list is empty.
	#[must_use]
	pub fn transfer(mut self, selector: impl FnOnce(&C::Input) -> TransferList + Send + 'static) -> Self {
		self.transfer = Some(Box::new(selector));
		self
	}

	/// Returns the input that will be posted.
	pub fn input(&self) -> &C::Input {
		&self.input
	}

	/// Returns the request's cancellation token.
	pub fn cancel_token(&self) -> &CancellationToken {
		&self.cancel
	}
}

impl<C> std::fmt::Debug for Request<C>
where
	C: IsolatedContext,
	C::Input: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Request")
			.field("input", &self.input)
			.field("cancelled", &self.cancel.is_cancelled())
			.field("transfer", &self.transfer.is_some())
			.finish_non_exhaustive()
	}
}
