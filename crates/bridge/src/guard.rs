use offload_protocol::{ContextFault, ContextListener, Inbound, IsolatedContext};

/// Exclusive owner of one invocation's context.
///
/// Terminates the context exactly once: explicitly on the settling branch, or on
/// drop when the invocation future is abandoned mid-race.
pub(crate) struct ContextGuard<C: IsolatedContext> {
	context: C,
	terminated: bool,
}

impl<C: IsolatedContext> ContextGuard<C> {
	pub(crate) fn new(context: C) -> Self {
		Self { context, terminated: false }
	}

	pub(crate) fn arm(&mut self, listener: ContextListener) {
		if !self.terminated {
			self.context.arm(listener);
		}
	}

	pub(crate) fn post(&mut self, message: Inbound<C::Input>) -> Result<(), ContextFault> {
		if self.terminated {
			return Err(ContextFault::Terminated);
		}
		self.context.post(message)
	}

	pub(crate) fn terminate(&mut self) {
		if std::mem::replace(&mut self.terminated, true) {
			return;
		}
		self.context.terminate();
	}
}

impl<C: IsolatedContext> Drop for ContextGuard<C> {
	fn drop(&mut self) {
		self.terminate();
	}
}
