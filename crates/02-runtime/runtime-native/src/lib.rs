#![deny(missing_docs)]
//! Native runtime for the gateway link bridge.
//!
//! Ties the queue and link crates together into a running bridge:
//! * [`BridgeContext`] – the links, the log channels and the stop signal,
//!   shared by the gateway thread and the consumer.
//! * [`LoggerBridge`] – routes the gateway's info/error output into log
//!   channels or straight through to stdout/stderr.
//! * [`Gateway`] / [`run_gateway`] – gateway lifecycle and teardown.
//! * [`BlockingWorker`] / [`BridgeClient`] – runs blocking calls off the
//!   caller's thread and hands results back as callbacks or futures.
//! * [`BridgeConfig`] – serializable tunables.
//! * [`SimulatedGateway`] – hardware-free gateway for tests and demos.

mod client;
mod config;
mod context;
mod gateway;
mod logger;
mod simulate;
mod worker;

pub use client::{BridgeClient, BufferResult};
pub use config::{BridgeConfig, LinkConfig, LogConfig, TimeVal};
pub use context::{BridgeContext, Frames, LogMessages};
pub use gateway::{run_gateway, Gateway, StopSignal};
pub use logger::{LogStream, LoggerBridge, STDERR_FD, STDOUT_FD};
pub use simulate::{
    SimulatedGateway, DEFAULT_KEEPALIVE, PROTOCOL_VERSION, PULL_DATA, PULL_DATA_LEN,
};
pub use worker::{BlockingWorker, Completion};

pub use link_queue::{HighWaterMark, QueueError, QueueResult, Timeout};
pub use link_table::{Direction, LinkId, RECV_FROM_BUFLEN, SEND_TO_BUFLEN};
