//! Reusable request builder for callers that invoke the same worker repeatedly.

use std::sync::Arc;

use offload_protocol::{IsolatedContext, TransferList};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::Outcome;
use crate::invoke::invoke;
use crate::request::Request;

type SharedFactory<C> = Arc<dyn Fn() -> C + Send + Sync>;
type SharedSelector<P> = Arc<dyn Fn(&P) -> TransferList + Send + Sync>;

/// Holds a context factory and an optional transfer selector and turns each
/// `(input, token)` pair into a fresh [`Request`].
///
/// This is the pure request-to-outcome function a reactive layer drives: it
/// decides when to call [`Loader::load`] and with which token, the loader never
/// reuses a context between calls.
pub struct Loader<C: IsolatedContext> {
	factory: SharedFactory<C>,
	transfer: Option<SharedSelector<C::Input>>,
}

impl<C: IsolatedContext> Clone for Loader<C> {
	fn clone(&self) -> Self {
		Self {
			factory: Arc::clone(&self.factory),
			transfer: self.transfer.clone(),
		}
	}
}

impl<C: IsolatedContext + 'static> Loader<C> {
	/// Creates a loader spawning contexts with `factory`.
	pub fn new(factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
		Self {
			factory: Arc::new(factory),
			transfer: None,
		}
	}

	/// Sets the transfer selector applied to every input.
	#[must_use]
	pub fn transfer(mut self, selector: impl Fn(&C::Input) -> TransferList + Send + Sync + 'static) -> Self {
		self.transfer = Some(Arc::new(selector));
		self
	}

	/// Builds the request for one invocation.
	pub fn request(&self, input: C::Input, cancel: CancellationToken) -> Request<C> {
		let factory = Arc::clone(&self.factory);
		let request = Request::new(input, cancel, move || factory());
		match &self.transfer {
			Some(selector) => {
				let selector = Arc::clone(selector);
				request.transfer(move |input| selector(input))
			}
			None => request,
		}
	}

	/// Invokes once with `input`, rejecting with `Aborted` when `cancel` fires first.
	pub async fn load<R>(&self, input: C::Input, cancel: CancellationToken) -> Outcome<R>
	where
		R: DeserializeOwned,
	{
		invoke(self.request(input, cancel)).await
	}
}
