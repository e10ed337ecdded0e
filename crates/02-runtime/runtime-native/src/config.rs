//! Serializable bridge configuration.
//!
//! Every tunable the host can push into a running bridge lives here, with the
//! same defaults the bridge starts with: unbounded high-water marks, blocking
//! timeouts and 1 KiB log messages. [`BridgeConfig::apply`] writes the whole
//! configuration into a live [`BridgeContext`].

use link_queue::{HighWaterMark, Timeout, DEFAULT_MAX_MESSAGE_SIZE};
use link_table::Direction;
use serde::{Deserialize, Serialize};

use crate::context::BridgeContext;

/// Threads the host pool starts with before long-blocking reads are added.
const HOST_POOL_THREADS: usize = 4;
/// Extra threads reserved for reads that may block for the gateway's lifetime.
const LONG_BLOCKING_THREADS: usize = 5;

/// Timeout as a `(seconds, microseconds)` pair.
///
/// Negative seconds block forever, `(0, 0)` polls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeVal {
    /// Whole seconds.
    pub secs: i64,
    /// Additional microseconds.
    pub micros: i64,
}

impl Default for TimeVal {
    fn default() -> Self {
        Self { secs: -1, micros: -1 }
    }
}

impl TimeVal {
    /// Decoded wait policy.
    pub fn timeout(&self) -> Timeout {
        Timeout::from_timeval(self.secs, self.micros)
    }
}

impl From<Timeout> for TimeVal {
    fn from(timeout: Timeout) -> Self {
        match timeout {
            Timeout::Block => Self::default(),
            other => {
                let micros = other.as_micros();
                Self {
                    secs: micros / 1_000_000,
                    micros: micros % 1_000_000,
                }
            }
        }
    }
}

/// Settings shared by the info and error log channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Longest rendered message; longer text is truncated.
    pub max_message_size: usize,
    /// Signed high-water mark for log writes.
    pub write_hwm: isize,
    /// How long a log write may wait for capacity.
    pub write_timeout: TimeVal,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            write_hwm: -1,
            write_timeout: TimeVal::default(),
        }
    }
}

/// Gateway-side settings for one link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Signed high-water mark the gateway honours when sending frames.
    pub gateway_send_hwm: isize,
    /// How long a gateway send may wait for capacity.
    pub gateway_send_timeout: TimeVal,
    /// How long a gateway receive may wait for a frame.
    pub gateway_recv_timeout: TimeVal,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            gateway_send_hwm: -1,
            gateway_send_timeout: TimeVal::default(),
            gateway_recv_timeout: TimeVal::default(),
        }
    }
}

/// Complete bridge configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log channel settings, applied to both streams.
    pub log: LogConfig,
    /// Uplink gateway settings.
    pub uplink: LinkConfig,
    /// Downlink gateway settings.
    pub downlink: LinkConfig,
    /// Size of the blocking worker pool.
    pub worker_threads: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            uplink: LinkConfig::default(),
            downlink: LinkConfig::default(),
            worker_threads: HOST_POOL_THREADS + LONG_BLOCKING_THREADS,
        }
    }
}

impl BridgeConfig {
    /// Settings for the link in `direction`.
    pub fn link(&self, direction: Direction) -> &LinkConfig {
        match direction {
            Direction::Uplink => &self.uplink,
            Direction::Downlink => &self.downlink,
        }
    }

    /// Pushes every value into the live context.
    pub fn apply(&self, ctx: &BridgeContext) {
        for direction in Direction::ALL {
            let settings = self.link(direction);
            let link = ctx.links().link(direction);
            link.set_gateway_send_hwm(HighWaterMark::from_raw(settings.gateway_send_hwm));
            link.set_gateway_send_timeout(settings.gateway_send_timeout.timeout());
            link.set_gateway_recv_timeout(settings.gateway_recv_timeout.timeout());
        }

        let logger = ctx.logger();
        logger.set_max_message_size(self.log.max_message_size);
        logger.set_write_hwm(HighWaterMark::from_raw(self.log.write_hwm));
        logger.set_write_timeout(self.log.write_timeout.timeout());
    }
}
