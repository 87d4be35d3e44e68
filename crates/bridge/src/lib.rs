//! Invocation bridge for isolated request/response work.
//!
//! Each invocation spawns a fresh [`IsolatedContext`](offload_protocol::IsolatedContext),
//! posts one input, and races the context's first reply against its fault
//! signals and a [`CancellationToken`](tokio_util::sync::CancellationToken).
//! Whichever fires first settles the [`Outcome`]; the context is terminated
//! exactly once before the outcome is returned.
//!
//! * [`invoke`]: the request-to-outcome entry point
//! * [`Request`]: one invocation's input, token and context factory
//! * [`Loader`]: reusable factory/selector pair producing requests
//! * [`SettleOnce`]: first-wins settlement slot fed by independent listeners

#![warn(missing_docs)]

pub mod error;
mod guard;
pub mod invoke;
pub mod loader;
pub mod request;
pub mod settle;

pub use error::{DEFAULT_CONTEXT_ERROR, InvokeError, Outcome};
pub use invoke::{Resolved, invoke, invoke_with_transfer};
pub use loader::Loader;
pub use request::Request;
pub use settle::{SettleOnce, Settled, settle_once};
