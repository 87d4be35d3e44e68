//! Shared vocabulary for both sides of an offload boundary.
//!
//! * [`Envelope`] and [`Reply`]: the outbound wire shape and its structural detection
//! * [`Inbound`], [`Outbound`], [`Transferable`]: messages and the resources moved with them
//! * [`IsolatedContext`], [`ContextListener`]: the seam between the invocation bridge and
//!   whatever execution environment hosts the handler

#![warn(missing_docs)]

pub mod context;
pub mod envelope;
pub mod message;

pub use context::{ContextEvent, ContextFault, ContextListener, IsolatedContext};
pub use envelope::{Envelope, Reply, failure_value, is_envelope};
pub use message::{Inbound, Outbound, TransferList, Transferable};
