//! Blocking queue primitives shared by the gateway links and log channels.
//!
//! This crate exposes the pieces every other layer is built from:
//! * [`BoundedQueue`] – mutex/condvar FIFO with byte accounting, high-water-mark
//!   gating and immediate or draining close.
//! * [`LogChannel`] – draining queue of formatted text with its own size,
//!   high-water-mark and timeout configuration.
//! * [`Timeout`] / [`HighWaterMark`] – typed views of the signed wait knobs.
//! * [`QueueError`] – the three conditions reported across the boundary.

mod error;
mod log_channel;
mod message;
mod queue;
pub mod wait;

pub use error::{QueueError, QueueResult};
pub use log_channel::{LogChannel, DEFAULT_MAX_MESSAGE_SIZE};
pub use message::Message;
pub use queue::{BoundedQueue, CloseMode, EmptyWait};
pub use wait::{AtomicHighWaterMark, AtomicTimeout, HighWaterMark, Timeout};
