/// Where a context's body executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContextClass {
	/// Cooperative async task on the runtime's worker threads. Termination
	/// preempts the body at its next await point.
	#[default]
	Async,
	/// Dedicated blocking-pool thread for CPU-bound bodies. Termination cannot
	/// preempt running code; the context is silenced and its inbox closed instead.
	Blocking,
}

impl ContextClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Async => "async",
			Self::Blocking => "blocking",
		}
	}
}
