use std::sync::Arc;

use offload_protocol::{ContextEvent, ContextListener};
use parking_lot::Mutex;

/// Shared event path from a context's body and watcher to its listener.
///
/// Events raised before [`Link::arm`] are queued and replayed on arm. After
/// [`Link::terminate`] every event is dropped.
///
/// Deliveries run under `delivery`, which [`Link::terminate`] also takes, so
/// terminate waits out an in-flight delivery and none starts afterwards. A
/// listener must not terminate its own link from inside `deliver`.
pub(crate) struct Link {
	name: Arc<str>,
	delivery: Mutex<()>,
	state: Mutex<LinkState>,
}

#[derive(Default)]
struct LinkState {
	listener: Option<ContextListener>,
	pending: Vec<ContextEvent>,
	terminated: bool,
}

/// Returned when an event is raised on a terminated link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Terminated;

impl Link {
	pub(crate) fn new(name: Arc<str>) -> Self {
		Self {
			name,
			delivery: Mutex::new(()),
			state: Mutex::new(LinkState::default()),
		}
	}

	pub(crate) fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn arm(&self, listener: ContextListener) {
		let _delivery = self.delivery.lock();
		let pending = {
			let mut state = self.state.lock();
			if state.terminated {
				return;
			}
			state.listener = Some(listener.clone());
			std::mem::take(&mut state.pending)
		};
		for event in pending {
			listener.deliver(event);
		}
	}

	pub(crate) fn emit(&self, event: ContextEvent) -> Result<(), Terminated> {
		let _delivery = self.delivery.lock();
		let listener = {
			let mut state = self.state.lock();
			if state.terminated {
				tracing::trace!(context = %self.name, event = event.as_str(), "worker.context.event_dropped");
				return Err(Terminated);
			}
			match &state.listener {
				Some(listener) => listener.clone(),
				None => {
					state.pending.push(event);
					return Ok(());
				}
			}
		};
		listener.deliver(event);
		Ok(())
	}

	pub(crate) fn is_terminated(&self) -> bool {
		self.state.lock().terminated
	}

	/// Marks the link terminated. Returns `true` for the first call only.
	pub(crate) fn terminate(&self) -> bool {
		let _delivery = self.delivery.lock();
		let mut state = self.state.lock();
		if state.terminated {
			return false;
		}
		state.terminated = true;
		state.listener = None;
		state.pending.clear();
		true
	}
}
