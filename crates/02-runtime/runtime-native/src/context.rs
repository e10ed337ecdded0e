use link_queue::{QueueError, Timeout};
use link_table::{Direction, LinkTable};
use tracing::debug;

use crate::gateway::StopSignal;
use crate::logger::{LogStream, LoggerBridge};

/// Everything the gateway and its consumer share.
///
/// One context is built per bridge and passed around behind an `Arc`; there
/// is no process-wide state.
#[derive(Debug, Default)]
pub struct BridgeContext {
    links: LinkTable,
    logger: LoggerBridge,
    stop: StopSignal,
}

impl BridgeContext {
    /// Creates a context with default configuration and logging stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// The uplink and downlink frame links.
    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Output redirection and the two log channels.
    pub fn logger(&self) -> &LoggerBridge {
        &self.logger
    }

    /// Flag the gateway polls to learn it should return.
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Re-arms both links with default configuration and clears the stop flag.
    ///
    /// Log channels are left alone; see [`LoggerBridge::reset_logging`].
    pub fn reset(&self) {
        self.links.reset();
        self.stop.clear();
        debug!("bridge context reset");
    }

    /// Blocking iterator over frames the gateway sends on `direction`.
    ///
    /// Each frame is read into a buffer of `buf_len` bytes. The iterator ends
    /// when the link closes or, for non-blocking timeouts, when no frame
    /// arrives in time.
    pub fn frames(&self, direction: Direction, buf_len: usize, timeout: Timeout) -> Frames<'_> {
        Frames {
            ctx: self,
            direction,
            buf_len,
            timeout,
        }
    }

    /// Blocking iterator over messages written to `stream`, ending once the
    /// channel is closed or drained after a graceful close.
    pub fn log_messages(&self, stream: LogStream) -> LogMessages<'_> {
        LogMessages { ctx: self, stream }
    }
}

/// Iterator returned by [`BridgeContext::frames`].
#[derive(Debug)]
pub struct Frames<'a> {
    ctx: &'a BridgeContext,
    direction: Direction,
    buf_len: usize,
    timeout: Timeout,
}

impl Iterator for Frames<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let mut buf = vec![0u8; self.buf_len];
        match self.ctx.links.link(self.direction).receive(&mut buf, self.timeout) {
            Ok(n) => {
                buf.truncate(n);
                Some(buf)
            }
            Err(QueueError::Closed | QueueError::WouldBlock) => None,
            Err(err) => {
                debug!(direction = %self.direction, %err, "frame stream ended");
                None
            }
        }
    }
}

/// Iterator returned by [`BridgeContext::log_messages`].
#[derive(Debug)]
pub struct LogMessages<'a> {
    ctx: &'a BridgeContext,
    stream: LogStream,
}

impl Iterator for LogMessages<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let message = self
            .ctx
            .logger
            .channel(self.stream)
            .read_message(Timeout::Block)
            .ok()?;
        Some(String::from_utf8_lossy(message.as_bytes()).into_owned())
    }
}
