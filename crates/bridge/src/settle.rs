//! Settle-once slot.
//!
//! Any number of producers race to fill a single slot; the first value wins and
//! every later attempt is refused without side effects.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Producer half of a settle-once slot.
#[derive(Debug)]
pub struct SettleOnce<T> {
	slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for SettleOnce<T> {
	fn clone(&self) -> Self {
		Self {
			slot: Arc::clone(&self.slot),
		}
	}
}

/// Consumer half of a settle-once slot.
#[derive(Debug)]
pub struct Settled<T> {
	rx: oneshot::Receiver<T>,
}

/// Creates a settle-once slot.
pub fn settle_once<T>() -> (SettleOnce<T>, Settled<T>) {
	let (tx, rx) = oneshot::channel();
	(
		SettleOnce {
			slot: Arc::new(Mutex::new(Some(tx))),
		},
		Settled { rx },
	)
}

impl<T> SettleOnce<T> {
	/// Settles the slot with `value`. Returns `false` if it was already settled or closed.
	pub fn settle(&self, value: T) -> bool {
		let Some(tx) = self.slot.lock().take() else {
			return false;
		};
		tx.send(value).is_ok()
	}

	/// Closes the slot without a value; later settle attempts are refused.
	pub fn close(&self) {
		self.slot.lock().take();
	}

	/// Returns `true` once the slot has been settled or closed.
	pub fn is_closed(&self) -> bool {
		self.slot.lock().is_none()
	}
}

impl<T> Settled<T> {
	/// Waits for the settled value. Returns `None` if the slot was closed empty.
	pub async fn wait(self) -> Option<T> {
		self.rx.await.ok()
	}
}
