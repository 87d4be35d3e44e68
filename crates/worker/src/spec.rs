use std::sync::Arc;

use crate::ContextClass;

/// Configuration for one [`TaskContext`](crate::TaskContext).
#[derive(Debug, Clone)]
pub struct ContextSpec {
	pub(crate) name: Arc<str>,
	pub(crate) class: ContextClass,
}

impl ContextSpec {
	/// Creates a spec for an async context with the given diagnostic name.
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			class: ContextClass::default(),
		}
	}

	/// Sets the execution class.
	#[must_use]
	pub fn class(mut self, class: ContextClass) -> Self {
		self.class = class;
		self
	}

	/// Diagnostic name used in logs.
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl Default for ContextSpec {
	fn default() -> Self {
		Self::new("worker")
	}
}
