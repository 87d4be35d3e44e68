//! Task-backed isolated contexts.
//!
//! A [`TaskContext`] owns one spawned body and the channels around it. The body
//! shares nothing with the orchestrating side: inputs arrive through its inbox,
//! replies leave through its outbox, and a watcher task turns a body error or
//! panic into a context fault.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use offload_protocol::{ContextEvent, ContextFault, ContextListener, Inbound, IsolatedContext};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::link::Link;
use crate::scope::{Outbox, WorkerScope};
use crate::spawn::{spawn_body, spawn_task};
use crate::{ContextSpec, EXITED_WITHOUT_REPLY, join_error_panic_message};

/// Code running inside an isolated context.
///
/// Returning `Err` or panicking faults the context. Returning `Ok` before the
/// context is terminated also faults it, since no further reply can arrive.
#[async_trait]
pub trait WorkerBody<P: Send + 'static>: Send + 'static {
	/// Serves the context until it is terminated.
	async fn run(&mut self, scope: WorkerScope<P>) -> Result<(), String>;
}

/// [`WorkerBody`] built from a closure. See [`body_fn`].
pub struct FnBody<F> {
	f: Option<F>,
}

/// Wraps a hand-written body closure.
///
/// ```ignore
/// let body = body_fn(|mut scope: WorkerScope<u32>| async move {
/// 	while let Some(msg) = scope.recv().await {
/// 		scope.outbox().post(&fibonacci(msg.data), Vec::new()).map_err(|e| e.to_string())?;
/// 	}
/// 	Ok(())
/// });
/// ```
pub fn body_fn<P, F, Fut>(f: F) -> FnBody<F>
where
	P: Send + 'static,
	F: FnOnce(WorkerScope<P>) -> Fut + Send + 'static,
	Fut: Future<Output = Result<(), String>> + Send + 'static,
{
	FnBody { f: Some(f) }
}

#[async_trait]
impl<P, F, Fut> WorkerBody<P> for FnBody<F>
where
	P: Send + 'static,
	F: FnOnce(WorkerScope<P>) -> Fut + Send + 'static,
	Fut: Future<Output = Result<(), String>> + Send + 'static,
{
	async fn run(&mut self, scope: WorkerScope<P>) -> Result<(), String> {
		let Some(f) = self.f.take() else {
			return Err("body already ran".to_string());
		};
		f(scope).await
	}
}

/// [`IsolatedContext`] whose execution environment is one spawned task.
///
/// Terminating aborts the body, closes its inbox and silences its outbox.
/// Dropping an unterminated context terminates it.
pub struct TaskContext<P> {
	spec: ContextSpec,
	link: Arc<Link>,
	inbox: Option<mpsc::UnboundedSender<Inbound<P>>>,
	body: AbortHandle,
}

impl<P: Send + 'static> TaskContext<P> {
	/// Spawns `body` in a fresh context.
	pub fn spawn(spec: ContextSpec, mut body: impl WorkerBody<P>) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		let link = Arc::new(Link::new(Arc::clone(&spec.name)));
		let scope = WorkerScope::new(Arc::clone(&spec.name), rx, Outbox::new(Arc::clone(&link)));

		let task = spawn_body(spec.class, &spec.name, async move { body.run(scope).await });
		let abort = task.abort_handle();

		let watch_link = Arc::clone(&link);
		spawn_task(async move {
			let fault = match task.await {
				Ok(Ok(())) => EXITED_WITHOUT_REPLY.to_string(),
				Ok(Err(err)) => err,
				Err(err) => match join_error_panic_message(err) {
					Some(msg) => msg,
					None => return,
				},
			};
			if watch_link.emit(ContextEvent::Fault(Some(fault.clone()))).is_ok() {
				tracing::debug!(context = watch_link.name(), error = %fault, "worker.context.fault");
			}
		});

		tracing::debug!(context = %spec.name, class = spec.class.as_str(), "worker.context.spawn");
		Self {
			spec,
			link,
			inbox: Some(tx),
			body: abort,
		}
	}

	/// Returns the context's spec.
	pub fn spec(&self) -> &ContextSpec {
		&self.spec
	}

	/// Returns `true` once terminated.
	pub fn is_terminated(&self) -> bool {
		self.link.is_terminated()
	}
}

impl<P: Send + 'static> IsolatedContext for TaskContext<P> {
	type Input = P;

	fn arm(&mut self, listener: ContextListener) {
		self.link.arm(listener);
	}

	fn post(&mut self, message: Inbound<P>) -> Result<(), ContextFault> {
		if self.link.is_terminated() {
			return Err(ContextFault::Terminated);
		}
		let inbox = self.inbox.as_ref().ok_or(ContextFault::Terminated)?;
		inbox.send(message).map_err(|_| ContextFault::Closed)
	}

	fn terminate(&mut self) {
		if !self.link.terminate() {
			return;
		}
		self.inbox = None;
		self.body.abort();
		tracing::debug!(context = %self.spec.name, "worker.context.terminate");
	}
}

impl<P> Drop for TaskContext<P> {
	fn drop(&mut self) {
		if self.link.terminate() {
			self.inbox = None;
			self.body.abort();
		}
	}
}

#[cfg(test)]
mod tests;
