//! Execution side of an offload: isolated contexts and the handler adapter.
//!
//! * [`TaskContext`]: an [`IsolatedContext`](offload_protocol::IsolatedContext) backed by a tokio task
//! * [`WorkerBody`]: code running inside a context, reading its inbox and posting replies
//! * [`HandlerAdapter`]: a [`WorkerBody`] wrapping a plain or async function into envelope replies

#![warn(missing_docs)]

mod class;
mod context;
mod handler;
mod link;
mod panic;
mod scope;
mod spawn;
mod spec;

pub use class::ContextClass;
pub use context::{FnBody, TaskContext, WorkerBody, body_fn};
pub use handler::HandlerAdapter;
pub use panic::{join_error_panic_message, panic_message};
pub use scope::{Outbox, OutboxError, WorkerScope};
pub use spec::ContextSpec;

/// Fault reported when a body returns without the context being terminated.
pub const EXITED_WITHOUT_REPLY: &str = "context exited without replying";
