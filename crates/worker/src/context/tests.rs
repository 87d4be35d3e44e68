use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use offload_protocol::Outbound;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::oneshot;

use super::*;
use crate::{ContextClass, OutboxError};

fn collector() -> (ContextListener, mpsc::UnboundedReceiver<ContextEvent>) {
	let (tx, rx) = mpsc::unbounded_channel();
	(ContextListener::new(move |event| tx.send(event).is_ok()), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<ContextEvent>) -> ContextEvent {
	tokio::time::timeout(Duration::from_secs(2), rx.recv())
		.await
		.expect("context event should arrive")
		.expect("listener channel open")
}

fn fault_message(event: ContextEvent) -> Option<String> {
	match event {
		ContextEvent::Fault(message) => message,
		other => panic!("expected a fault, got {other:?}"),
	}
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
	fn drop(&mut self) {
		self.0.store(true, Ordering::SeqCst);
	}
}

#[tokio::test]
async fn hand_written_body_posts_plain_reply() {
	let (listener, mut rx) = collector();
	let mut context = TaskContext::spawn(
		ContextSpec::new("fib"),
		body_fn(|mut scope: WorkerScope<u64>| async move {
			while let Some(msg) = scope.recv().await {
				scope.outbox().post(&(msg.data + 1), Vec::new()).map_err(|e| e.to_string())?;
			}
			Ok(())
		}),
	);
	context.arm(listener);
	context.post(Inbound::new(41)).unwrap();

	match next_event(&mut rx).await {
		ContextEvent::Message(reply) => assert_eq!(reply, Outbound::new(json!(42))),
		other => panic!("expected a reply, got {other:?}"),
	}
	context.terminate();
}

#[tokio::test]
async fn events_before_arm_are_replayed() {
	let (posted_tx, posted_rx) = oneshot::channel();
	let mut context = TaskContext::<()>::spawn(
		ContextSpec::default(),
		body_fn(move |scope: WorkerScope<()>| async move {
			scope.outbox().post("early", Vec::new()).map_err(|e| e.to_string())?;
			let _ = posted_tx.send(());
			std::future::pending::<()>().await;
			Ok(())
		}),
	);
	posted_rx.await.unwrap();

	let (listener, mut rx) = collector();
	context.arm(listener);

	match next_event(&mut rx).await {
		ContextEvent::Message(reply) => assert_eq!(reply.data, json!("early")),
		other => panic!("expected a reply, got {other:?}"),
	}
}

#[tokio::test]
async fn body_error_faults_context() {
	let (listener, mut rx) = collector();
	let mut context = TaskContext::<()>::spawn(ContextSpec::new("bad-init"), body_fn(|_: WorkerScope<()>| async { Err("bad init".to_string()) }));
	context.arm(listener);

	assert_eq!(fault_message(next_event(&mut rx).await).as_deref(), Some("bad init"));
}

#[tokio::test]
async fn body_panic_faults_context() {
	let (listener, mut rx) = collector();
	let explode = true;
	let mut context = TaskContext::<()>::spawn(
		ContextSpec::new("panicky"),
		body_fn(move |_: WorkerScope<()>| async move {
			if explode {
				panic!("body boom");
			}
			Ok(())
		}),
	);
	context.arm(listener);

	assert_eq!(fault_message(next_event(&mut rx).await).as_deref(), Some("body boom"));
}

#[tokio::test]
async fn body_returning_early_faults_context() {
	let (listener, mut rx) = collector();
	let mut context = TaskContext::<()>::spawn(ContextSpec::new("quitter"), body_fn(|_: WorkerScope<()>| async { Ok(()) }));
	context.arm(listener);

	assert_eq!(fault_message(next_event(&mut rx).await).as_deref(), Some(EXITED_WITHOUT_REPLY));
}

#[tokio::test]
async fn unserializable_post_raises_message_error() {
	let (result_tx, result_rx) = oneshot::channel();
	let (listener, mut rx) = collector();
	let mut context = TaskContext::<()>::spawn(
		ContextSpec::new("bad-reply"),
		body_fn(move |mut scope: WorkerScope<()>| async move {
			if scope.recv().await.is_some() {
				let map = HashMap::from([((1u8, 2u8), 3u8)]);
				let _ = result_tx.send(scope.outbox().post(&map, Vec::new()));
			}
			std::future::pending::<()>().await;
			Ok(())
		}),
	);
	context.arm(listener);
	context.post(Inbound::new(())).unwrap();

	assert!(matches!(next_event(&mut rx).await, ContextEvent::MessageError));
	assert!(matches!(result_rx.await.unwrap(), Err(OutboxError::Serialize(_))));
}

#[tokio::test]
async fn terminate_aborts_body_and_refuses_posts() {
	let dropped = Arc::new(AtomicBool::new(false));
	let (started_tx, started_rx) = oneshot::channel();
	let flag = DropFlag(Arc::clone(&dropped));
	let (listener, mut rx) = collector();
	let mut context = TaskContext::<u32>::spawn(
		ContextSpec::new("sleeper"),
		body_fn(move |_: WorkerScope<u32>| async move {
			let _flag = flag;
			let _ = started_tx.send(());
			std::future::pending::<()>().await;
			Ok(())
		}),
	);
	context.arm(listener);
	started_rx.await.unwrap();

	context.terminate();
	context.terminate();

	assert!(context.is_terminated());
	assert_eq!(context.post(Inbound::new(1)).unwrap_err(), ContextFault::Terminated);
	tokio::time::timeout(Duration::from_secs(2), async {
		while !dropped.load(Ordering::SeqCst) {
			tokio::task::yield_now().await;
		}
	})
	.await
	.expect("body should be aborted");
	assert!(rx.try_recv().is_err(), "terminated context must stay silent");
}

#[tokio::test]
async fn outbox_closes_after_terminate() {
	let (outbox_tx, outbox_rx) = oneshot::channel();
	let mut context = TaskContext::<()>::spawn(
		ContextSpec::new("closer"),
		body_fn(move |scope: WorkerScope<()>| async move {
			let _ = outbox_tx.send(scope.outbox().clone());
			std::future::pending::<()>().await;
			Ok(())
		}),
	);
	let outbox = outbox_rx.await.unwrap();
	assert!(!outbox.is_closed());

	context.terminate();

	assert!(outbox.is_closed());
	assert!(matches!(outbox.post(&1, Vec::new()), Err(OutboxError::Closed)));
}

#[tokio::test]
async fn dropping_context_terminates_it() {
	let dropped = Arc::new(AtomicBool::new(false));
	let flag = DropFlag(Arc::clone(&dropped));
	let context = TaskContext::<()>::spawn(
		ContextSpec::new("dropped"),
		body_fn(move |_: WorkerScope<()>| async move {
			let _flag = flag;
			std::future::pending::<()>().await;
			Ok(())
		}),
	);
	tokio::task::yield_now().await;
	drop(context);

	tokio::time::timeout(Duration::from_secs(2), async {
		while !dropped.load(Ordering::SeqCst) {
			tokio::task::yield_now().await;
		}
	})
	.await
	.expect("body should be aborted on drop");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_class_runs_body_off_the_async_workers() {
	let (listener, mut rx) = collector();
	let spec = ContextSpec::new("cpu").class(ContextClass::Blocking);
	let mut context = TaskContext::spawn(
		spec,
		body_fn(|mut scope: WorkerScope<u32>| async move {
			while let Some(msg) = scope.recv().await {
				let sum: u64 = (1..=u64::from(msg.data)).sum();
				scope.outbox().post(&sum, Vec::new()).map_err(|e| e.to_string())?;
			}
			Ok(())
		}),
	);
	assert_eq!(context.spec().class, ContextClass::Blocking);
	context.arm(listener);
	context.post(Inbound::new(100)).unwrap();

	match next_event(&mut rx).await {
		ContextEvent::Message(reply) => assert_eq!(reply.data, json!(5050)),
		other => panic!("expected a reply, got {other:?}"),
	}
	context.terminate();
}
