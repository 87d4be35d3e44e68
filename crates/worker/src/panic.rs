use std::any::Any;

use tokio::task::JoinError;

/// Extracts the message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return (*msg).to_string();
	}
	if let Some(msg) = payload.downcast_ref::<String>() {
		return msg.clone();
	}
	"<unknown panic>".to_string()
}

/// Returns the panic message of a failed task, or `None` if it was cancelled.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	Some(panic_message(&*err.into_panic()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn static_str_payload() {
		let handle = tokio::spawn(async { panic!("boom-str") });
		let err = handle.await.unwrap_err();
		assert_eq!(join_error_panic_message(err).as_deref(), Some("boom-str"));
	}

	#[tokio::test]
	async fn formatted_payload() {
		let handle = tokio::spawn(async { panic!("boom-{}", 7) });
		let err = handle.await.unwrap_err();
		assert_eq!(join_error_panic_message(err).as_deref(), Some("boom-7"));
	}

	#[tokio::test]
	async fn aborted_task_has_no_message() {
		let handle = tokio::spawn(std::future::pending::<()>());
		handle.abort();
		let err = handle.await.unwrap_err();
		assert!(join_error_panic_message(err).is_none());
	}

	#[test]
	fn opaque_payload() {
		let payload: Box<dyn Any + Send> = Box::new(17u8);
		assert_eq!(panic_message(&*payload), "<unknown panic>");
	}
}
