//! Host-facing surface of the bridge.
//!
//! [`BridgeClient`] pairs a shared [`BridgeContext`] with a
//! [`BlockingWorker`]. Every call that may block is executed on the worker
//! and reports through a callback, which runs when the host thread calls
//! [`BridgeClient::dispatch_pending`] or [`BridgeClient::dispatch_timeout`].
//! Calls that carry a buffer take ownership of it for the duration of the
//! call and hand it back to the callback alongside the result.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use link_queue::{HighWaterMark, QueueResult, Timeout};
use link_table::Direction;

use crate::config::BridgeConfig;
use crate::context::BridgeContext;
use crate::gateway::{run_gateway, Gateway};
use crate::logger::LogStream;
use crate::worker::{BlockingWorker, Completion};

/// Result and buffer handed back by buffer-carrying calls.
pub type BufferResult = (QueueResult<usize>, Vec<u8>);

/// Asynchronous client over one bridge context and one gateway.
pub struct BridgeClient {
    ctx: Arc<BridgeContext>,
    gateway: Arc<dyn Gateway>,
    worker: BlockingWorker,
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("ctx", &self.ctx)
            .field("worker", &self.worker)
            .finish_non_exhaustive()
    }
}

impl BridgeClient {
    /// Creates a client with its own context configured from `config`.
    pub fn new(gateway: Arc<dyn Gateway>, config: &BridgeConfig) -> io::Result<Self> {
        let ctx = Arc::new(BridgeContext::new());
        config.apply(&ctx);
        Self::with_context(ctx, gateway, config.worker_threads)
    }

    /// Creates a client over an existing context.
    pub fn with_context(
        ctx: Arc<BridgeContext>,
        gateway: Arc<dyn Gateway>,
        threads: usize,
    ) -> io::Result<Self> {
        Ok(Self {
            ctx,
            gateway,
            worker: BlockingWorker::spawn(threads)?,
        })
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.ctx
    }

    /// Runs queued callbacks on this thread.
    pub fn dispatch_pending(&self) -> usize {
        self.worker.dispatch_pending()
    }

    /// Waits up to `timeout` for a callback, then runs every queued one.
    pub fn dispatch_timeout(&self, timeout: Duration) -> usize {
        self.worker.dispatch_timeout(timeout)
    }

    /// Starts the gateway on a worker; `callback` receives its exit result.
    ///
    /// The gateway holds its worker until it stops.
    pub fn start<C>(&self, config_dir: Option<PathBuf>, callback: C) -> QueueResult<()>
    where
        C: FnOnce(anyhow::Result<()>) + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        let gateway = Arc::clone(&self.gateway);
        self.worker.submit(
            move || run_gateway(&ctx, gateway.as_ref(), config_dir.as_deref()),
            callback,
        )
    }

    /// Asks the running gateway to stop.
    pub fn stop(&self) {
        self.gateway.stop(&self.ctx);
    }

    /// Re-arms the links and clears the stop request.
    pub fn reset(&self) {
        self.ctx.reset();
    }

    /// Receives a frame from `link` into `buf`.
    pub fn recv_from<C>(
        &self,
        link: i32,
        buf: Vec<u8>,
        timeout: Timeout,
        callback: C,
    ) -> QueueResult<()>
    where
        C: FnOnce(QueueResult<usize>, Vec<u8>) + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        self.worker.submit(
            move || {
                let mut buf = buf;
                let result = ctx.links().receive_from(link, &mut buf, timeout);
                (result, buf)
            },
            move |(result, buf)| callback(result, buf),
        )
    }

    /// Sends the frame in `buf` into `link`.
    pub fn send_to<C>(
        &self,
        link: i32,
        buf: Vec<u8>,
        hwm: HighWaterMark,
        timeout: Timeout,
        callback: C,
    ) -> QueueResult<()>
    where
        C: FnOnce(QueueResult<usize>, Vec<u8>) + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        self.worker.submit(
            move || {
                let result = ctx.links().send_to(link, &buf, hwm, timeout);
                (result, buf)
            },
            move |(result, buf)| callback(result, buf),
        )
    }

    /// Promise form of [`BridgeClient::recv_from`].
    pub fn recv_from_async(
        &self,
        link: i32,
        buf: Vec<u8>,
        timeout: Timeout,
    ) -> Completion<BufferResult> {
        let ctx = Arc::clone(&self.ctx);
        self.worker.call(move || {
            let mut buf = buf;
            let result = ctx.links().receive_from(link, &mut buf, timeout);
            (result, buf)
        })
    }

    /// Promise form of [`BridgeClient::send_to`].
    pub fn send_to_async(
        &self,
        link: i32,
        buf: Vec<u8>,
        hwm: HighWaterMark,
        timeout: Timeout,
    ) -> Completion<BufferResult> {
        let ctx = Arc::clone(&self.ctx);
        self.worker.call(move || {
            let result = ctx.links().send_to(link, &buf, hwm, timeout);
            (result, buf)
        })
    }

    /// Reads the next info message into `buf`.
    pub fn log_info_message<C>(
        &self,
        buf: Vec<u8>,
        timeout: Timeout,
        callback: C,
    ) -> QueueResult<()>
    where
        C: FnOnce(QueueResult<usize>, Vec<u8>) + Send + 'static,
    {
        self.log_message(LogStream::Info, buf, timeout, callback)
    }

    /// Reads the next error message into `buf`.
    pub fn log_error_message<C>(
        &self,
        buf: Vec<u8>,
        timeout: Timeout,
        callback: C,
    ) -> QueueResult<()>
    where
        C: FnOnce(QueueResult<usize>, Vec<u8>) + Send + 'static,
    {
        self.log_message(LogStream::Error, buf, timeout, callback)
    }

    fn log_message<C>(
        &self,
        stream: LogStream,
        buf: Vec<u8>,
        timeout: Timeout,
        callback: C,
    ) -> QueueResult<()>
    where
        C: FnOnce(QueueResult<usize>, Vec<u8>) + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        self.worker.submit(
            move || {
                let mut buf = buf;
                let result = ctx.logger().channel(stream).read(&mut buf, timeout);
                (result, buf)
            },
            move |(result, buf)| callback(result, buf),
        )
    }

    /// Routes gateway output into the log channels.
    pub fn start_logging(&self) {
        self.ctx.logger().start_logging();
    }

    /// Stops routing output and closes both log channels.
    pub fn stop_logging(&self) {
        self.ctx.logger().stop_logging();
    }

    /// Re-arms both log channels.
    pub fn reset_logging(&self) {
        self.ctx.logger().reset_logging();
    }

    /// Sets the high-water mark the gateway uses when sending on `link`.
    pub fn set_gw_send_hwm(&self, link: i32, hwm: HighWaterMark) -> QueueResult<()> {
        let direction = Direction::try_from(link)?;
        self.ctx.links().link(direction).set_gateway_send_hwm(hwm);
        Ok(())
    }

    /// Sets how long the gateway may wait when sending on `link`.
    pub fn set_gw_send_timeout(&self, link: i32, timeout: Timeout) -> QueueResult<()> {
        let direction = Direction::try_from(link)?;
        self.ctx.links().link(direction).set_gateway_send_timeout(timeout);
        Ok(())
    }

    /// Sets how long the gateway may wait when receiving on `link`.
    pub fn set_gw_recv_timeout(&self, link: i32, timeout: Timeout) -> QueueResult<()> {
        let direction = Direction::try_from(link)?;
        self.ctx.links().link(direction).set_gateway_recv_timeout(timeout);
        Ok(())
    }

    /// Sets the log message limit on both channels.
    pub fn set_log_max_msg_size(&self, size: usize) {
        self.ctx.logger().set_max_message_size(size);
    }

    /// Larger of the two log message limits.
    pub fn log_max_msg_size(&self) -> usize {
        self.ctx.logger().max_message_size()
    }

    /// Sets the log write high-water mark on both channels.
    pub fn set_log_write_hwm(&self, hwm: HighWaterMark) {
        self.ctx.logger().set_write_hwm(hwm);
    }

    /// Sets the log write timeout on both channels.
    pub fn set_log_write_timeout(&self, timeout: Timeout) {
        self.ctx.logger().set_write_timeout(timeout);
    }

    /// Stops the gateway, closes every queue and joins the workers.
    ///
    /// Dropping the client does the same.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for BridgeClient {
    /// Releases every job parked in the gateway or a queue so the worker
    /// pool can join.
    fn drop(&mut self) {
        self.stop();
        self.ctx.links().close();
        self.ctx.logger().stop_logging();
    }
}
