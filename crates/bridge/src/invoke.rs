//! The request-to-outcome race.

use std::sync::atomic::{AtomicU64, Ordering};

use offload_protocol::{ContextEvent, ContextListener, Inbound, IsolatedContext, Outbound, Reply, TransferList};
use serde::de::DeserializeOwned;

use crate::error::{InvokeError, Outcome};
use crate::guard::ContextGuard;
use crate::request::Request;
use crate::settle::{SettleOnce, settle_once};

static NEXT_INVOCATION: AtomicU64 = AtomicU64::new(1);

/// Resolved reply together with the resources the context moved back.
#[derive(Debug)]
pub struct Resolved<R> {
	/// Decoded result.
	pub value: R,
	/// Resources transferred with the reply.
	pub transfer: TransferList,
}

/// Runs `request` in a fresh isolated context and settles exactly one outcome.
///
/// See [`invoke_with_transfer`] for the race semantics.
pub async fn invoke<C, R>(request: Request<C>) -> Outcome<R>
where
	C: IsolatedContext,
	R: DeserializeOwned,
{
	invoke_with_transfer(request).await.map(|resolved| resolved.value)
}

/// Runs `request` and keeps the transfer list attached to the reply.
///
/// The factory is called exactly once. A token that is already cancelled
/// rejects with [`InvokeError::Aborted`] before anything is posted. Otherwise
/// the input is posted and the first of cancellation, reply, context fault or
/// malformed reply settles the outcome, with cancellation taking priority when
/// several are ready together. The context is terminated exactly once before
/// this returns, and also when the returned future is dropped early.
pub async fn invoke_with_transfer<C, R>(request: Request<C>) -> Outcome<Resolved<R>>
where
	C: IsolatedContext,
	R: DeserializeOwned,
{
	let Request {
		input,
		cancel,
		factory,
		transfer,
	} = request;
	let invocation = NEXT_INVOCATION.fetch_add(1, Ordering::Relaxed);

	let mut context = ContextGuard::new(factory());

	if cancel.is_cancelled() {
		context.terminate();
		tracing::debug!(invocation, "bridge.invoke.aborted_before_post");
		return Err(InvokeError::Aborted);
	}

	let (settle, settled) = settle_once::<ContextEvent>();
	context.arm(listener(invocation, settle.clone()));

	let transfer = transfer.map(|select| select(&input)).unwrap_or_default();
	if cancel.is_cancelled() {
		settle.close();
		context.terminate();
		tracing::debug!(invocation, "bridge.invoke.aborted_before_post");
		return Err(InvokeError::Aborted);
	}
	tracing::trace!(invocation, transfer = transfer.len(), "bridge.invoke.post");
	if let Err(fault) = context.post(Inbound::new(input).with_transfer(transfer)) {
		settle.close();
		context.terminate();
		tracing::debug!(invocation, error = %fault, "bridge.invoke.post_failed");
		return Err(InvokeError::ContextFailure(fault.to_string()));
	}

	let outcome = tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(InvokeError::Aborted),
		event = settled.wait() => match event {
			Some(event) => interpret(invocation, event),
			None => Err(InvokeError::context(None)),
		},
	};

	settle.close();
	context.terminate();
	match &outcome {
		Ok(_) => tracing::debug!(invocation, "bridge.invoke.resolved"),
		Err(err) => tracing::debug!(invocation, error = %err, "bridge.invoke.rejected"),
	}
	outcome
}

fn listener(invocation: u64, settle: SettleOnce<ContextEvent>) -> ContextListener {
	ContextListener::new(move |event| {
		let label = event.as_str();
		let accepted = settle.settle(event);
		if !accepted {
			tracing::trace!(invocation, event = label, "bridge.event.ignored");
		}
		accepted
	})
}

fn interpret<R: DeserializeOwned>(invocation: u64, event: ContextEvent) -> Outcome<Resolved<R>> {
	match event {
		ContextEvent::Message(Outbound { data, transfer }) => match Reply::classify(data).into_result() {
			Ok(value) => serde_json::from_value(value).map(|value| Resolved { value, transfer }).map_err(|err| {
				tracing::debug!(invocation, error = %err, "bridge.reply.decode_failed");
				InvokeError::DeserializationFailure
			}),
			Err(description) => Err(InvokeError::HandlerFailure(description)),
		},
		ContextEvent::Fault(message) => Err(InvokeError::context(message)),
		ContextEvent::MessageError => Err(InvokeError::DeserializationFailure),
	}
}
