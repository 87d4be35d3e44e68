use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

use crate::ContextClass;

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("offload-worker-global")
			.build()
			.expect("failed to build offload-worker global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns a context body according to its class.
pub(crate) fn spawn_body<F>(class: ContextClass, name: &str, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(context = name, class = class.as_str(), "worker.spawn");
	let handle = runtime_handle();
	match class {
		ContextClass::Async => handle.spawn(fut),
		ContextClass::Blocking => {
			let inner = handle.clone();
			handle.spawn_blocking(move || inner.block_on(fut))
		}
	}
}

/// Spawns a plain async task on the worker runtime.
pub(crate) fn spawn_task<F>(fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	runtime_handle().spawn(fut)
}
