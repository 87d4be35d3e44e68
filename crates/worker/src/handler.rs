//! Handler adapter: turns a function into an envelope-speaking worker body.
//!
//! Every inbound message runs the handler once and produces exactly one reply:
//! `{ "ok": true, "value": ... }` carrying the selected transfer list, or
//! `{ "ok": false, "error": ... }` with no transfer list when the handler
//! returns an error or panics. Handlers built with [`HandlerAdapter::new_inbound`]
//! or [`HandlerAdapter::from_inbound_fn`] also take ownership of the resources
//! transferred with their input.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use async_trait::async_trait;
use offload_protocol::{Envelope, Inbound, Outbound, TransferList, failure_value};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::scope::WorkerScope;
use crate::spawn::spawn_task;
use crate::{WorkerBody, join_error_panic_message, panic_message};

type HandlerFuture<R> = Pin<Box<dyn Future<Output = Result<R, String>> + Send>>;
type ResultSelector<R> = Box<dyn Fn(&R) -> TransferList + Send + Sync>;

enum Handler<P, R> {
	Sync(Box<dyn Fn(Inbound<P>) -> Result<R, String> + Send + Sync>),
	Async(Box<dyn Fn(Inbound<P>) -> HandlerFuture<R> + Send + Sync>),
}

/// Wraps a sync or async handler into a [`WorkerBody`] answering with envelopes.
///
/// The adapter serves every message that reaches its inbox; the invocation
/// bridge only ever reads the first reply.
pub struct HandlerAdapter<P, R> {
	handler: Handler<P, R>,
	transfer: Option<ResultSelector<R>>,
}

impl<P, R> HandlerAdapter<P, R>
where
	P: Send + 'static,
	R: Serialize + Send + 'static,
{
	/// Adapts an async handler. The handler future runs in its own task so a
	/// panic is reported as a failure reply instead of faulting the context.
	///
	/// Resources transferred with the input are dropped unread; use
	/// [`HandlerAdapter::new_inbound`] to receive them.
	pub fn new<F, Fut, E>(handler: F) -> Self
	where
		F: Fn(P) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<R, E>> + Send + 'static,
		E: Display + 'static,
	{
		Self::new_inbound(move |message: Inbound<P>| handler(message.data))
	}

	/// Adapts an async handler that receives the whole inbound message,
	/// transfer list included.
	pub fn new_inbound<F, Fut, E>(handler: F) -> Self
	where
		F: Fn(Inbound<P>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<R, E>> + Send + 'static,
		E: Display + 'static,
	{
		let handler = move |message: Inbound<P>| -> HandlerFuture<R> {
			let fut = handler(message);
			Box::pin(async move { fut.await.map_err(|err| err.to_string()) })
		};
		Self {
			handler: Handler::Async(Box::new(handler)),
			transfer: None,
		}
	}

	/// Adapts a synchronous handler, run inline on the context's thread.
	pub fn from_fn<F, E>(handler: F) -> Self
	where
		F: Fn(P) -> Result<R, E> + Send + Sync + 'static,
		E: Display + 'static,
	{
		Self::from_inbound_fn(move |message: Inbound<P>| handler(message.data))
	}

	/// Adapts a synchronous handler that receives the whole inbound message.
	pub fn from_inbound_fn<F, E>(handler: F) -> Self
	where
		F: Fn(Inbound<P>) -> Result<R, E> + Send + Sync + 'static,
		E: Display + 'static,
	{
		Self {
			handler: Handler::Sync(Box::new(move |message: Inbound<P>| handler(message).map_err(|err| err.to_string()))),
			transfer: None,
		}
	}

	/// Selects resources to move back with each successful result.
	#[must_use]
	pub fn transfer(mut self, selector: impl Fn(&R) -> TransferList + Send + Sync + 'static) -> Self {
		self.transfer = Some(Box::new(selector));
		self
	}

	/// Runs the handler on one input with nothing transferred and builds the reply.
	pub async fn respond(&self, input: P) -> Outbound {
		self.respond_to(Inbound::new(input)).await
	}

	/// Runs the handler on one inbound message and builds the reply.
	pub async fn respond_to(&self, message: Inbound<P>) -> Outbound {
		let result = match self.call(message).await {
			Ok(result) => result,
			Err(description) => {
				tracing::debug!(error = %description, "worker.handler.failed");
				return Outbound::new(failure_value(description));
			}
		};
		match (Envelope::Success { value: &result }).to_value() {
			Ok(data) => {
				let transfer = self.transfer.as_ref().map(|select| select(&result)).unwrap_or_default();
				Outbound::new(data).with_transfer(transfer)
			}
			Err(err) => {
				tracing::debug!(error = %err, "worker.handler.unserializable");
				Outbound::new(failure_value(format_args!("result could not be serialized: {err}")))
			}
		}
	}

	async fn call(&self, message: Inbound<P>) -> Result<R, String> {
		match &self.handler {
			Handler::Sync(f) => std::panic::catch_unwind(AssertUnwindSafe(|| f(message))).unwrap_or_else(|payload| Err(panic_message(&*payload))),
			Handler::Async(f) => {
				let mut task = AbortOnDrop(spawn_task(f(message)));
				match (&mut task.0).await {
					Ok(result) => result,
					Err(err) => Err(join_error_panic_message(err).unwrap_or_else(|| "handler task cancelled".to_string())),
				}
			}
		}
	}
}

#[async_trait]
impl<P, R> WorkerBody<P> for HandlerAdapter<P, R>
where
	P: Send + 'static,
	R: Serialize + Send + 'static,
{
	async fn run(&mut self, mut scope: WorkerScope<P>) -> Result<(), String> {
		while let Some(message) = scope.recv().await {
			let reply = self.respond_to(message).await;
			if scope.outbox().post_message(reply).is_err() {
				break;
			}
		}
		Ok(())
	}
}

/// Aborts the handler task when the body is torn down mid-call.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
	fn drop(&mut self) {
		self.0.abort();
	}
}
