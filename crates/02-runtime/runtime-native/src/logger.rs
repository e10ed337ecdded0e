//! Redirection of the gateway's formatted output into log channels.
//!
//! The gateway writes diagnostics to file descriptor 1 (info) or 2 (error).
//! While logging is started those writes land in the matching
//! [`LogChannel`]; otherwise they go to the real stdout/stderr. The route is
//! an [`ArcSwapOption`] so writers never take a lock to find it.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use link_queue::{CloseMode, HighWaterMark, LogChannel, QueueError, QueueResult, Timeout};
use tracing::debug;

/// Output file descriptor of the info stream.
pub const STDOUT_FD: i32 = 1;
/// Output file descriptor of the error stream.
pub const STDERR_FD: i32 = 2;

/// One of the two diagnostic streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogStream {
    /// Routine progress output.
    Info,
    /// Failures and warnings.
    Error,
}

impl LogStream {
    /// Both streams.
    pub const ALL: [LogStream; 2] = [LogStream::Info, LogStream::Error];

    /// Maps an output file descriptor to its stream.
    pub fn from_fd(fd: i32) -> QueueResult<Self> {
        match fd {
            STDOUT_FD => Ok(LogStream::Info),
            STDERR_FD => Ok(LogStream::Error),
            _ => Err(QueueError::InvalidArgument("unknown output stream")),
        }
    }

    /// Short name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            LogStream::Info => "info",
            LogStream::Error => "error",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
struct LogRoute {
    info: Arc<LogChannel>,
    error: Arc<LogChannel>,
}

impl LogRoute {
    fn channel(&self, stream: LogStream) -> &LogChannel {
        match stream {
            LogStream::Info => &self.info,
            LogStream::Error => &self.error,
        }
    }
}

/// Swappable hook between the gateway's output calls and the log channels.
#[derive(Debug)]
pub struct LoggerBridge {
    info: Arc<LogChannel>,
    error: Arc<LogChannel>,
    route: ArcSwapOption<LogRoute>,
}

impl Default for LoggerBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBridge {
    /// Creates a bridge with fresh channels and no route installed.
    pub fn new() -> Self {
        Self {
            info: Arc::new(LogChannel::new()),
            error: Arc::new(LogChannel::new()),
            route: ArcSwapOption::empty(),
        }
    }

    /// Channel backing `stream`.
    pub fn channel(&self, stream: LogStream) -> &Arc<LogChannel> {
        match stream {
            LogStream::Info => &self.info,
            LogStream::Error => &self.error,
        }
    }

    /// Installs the route so output lands in the channels.
    pub fn start_logging(&self) {
        self.route.store(Some(Arc::new(LogRoute {
            info: Arc::clone(&self.info),
            error: Arc::clone(&self.error),
        })));
        debug!("log route installed");
    }

    /// Removes the route and closes both channels immediately.
    pub fn stop_logging(&self) {
        self.route.store(None);
        self.close(CloseMode::Immediate);
        debug!("log route removed");
    }

    /// Re-arms both channels without touching the route.
    pub fn reset_logging(&self) {
        self.info.reset();
        self.error.reset();
    }

    /// Whether output currently goes to the channels.
    pub fn is_logging(&self) -> bool {
        self.route.load().is_some()
    }

    /// Closes both channels with `mode`.
    pub fn close(&self, mode: CloseMode) {
        self.info.close(mode);
        self.error.close(mode);
    }

    /// Writes formatted output tagged with an output file descriptor.
    ///
    /// Descriptors other than 1 and 2 are rejected with `InvalidArgument`.
    pub fn write_fd(&self, fd: i32, args: fmt::Arguments<'_>) -> QueueResult<usize> {
        self.write(LogStream::from_fd(fd)?, args)
    }

    /// Writes formatted output to `stream`, returning the bytes accepted.
    pub fn write(&self, stream: LogStream, args: fmt::Arguments<'_>) -> QueueResult<usize> {
        match self.route.load().as_deref() {
            Some(route) => route.channel(stream).write(args),
            None => passthrough(stream, args),
        }
    }

    /// Shorthand for [`LoggerBridge::write`] on the info stream.
    pub fn info(&self, args: fmt::Arguments<'_>) -> QueueResult<usize> {
        self.write(LogStream::Info, args)
    }

    /// Shorthand for [`LoggerBridge::write`] on the error stream.
    pub fn error(&self, args: fmt::Arguments<'_>) -> QueueResult<usize> {
        self.write(LogStream::Error, args)
    }

    /// Larger of the two channels' message limits.
    pub fn max_message_size(&self) -> usize {
        self.info.max_message_size().max(self.error.max_message_size())
    }

    /// Sets the message limit on both channels.
    pub fn set_max_message_size(&self, size: usize) {
        self.info.set_max_message_size(size);
        self.error.set_max_message_size(size);
    }

    /// Sets the write high-water mark on both channels.
    pub fn set_write_hwm(&self, hwm: HighWaterMark) {
        self.info.set_write_hwm(hwm);
        self.error.set_write_hwm(hwm);
    }

    /// Sets the write timeout on both channels.
    pub fn set_write_timeout(&self, timeout: Timeout) {
        self.info.set_write_timeout(timeout);
        self.error.set_write_timeout(timeout);
    }
}

fn passthrough(stream: LogStream, args: fmt::Arguments<'_>) -> QueueResult<usize> {
    let text = fmt::format(args);
    let written = match stream {
        LogStream::Info => io::stdout().lock().write_all(text.as_bytes()),
        LogStream::Error => io::stderr().lock().write_all(text.as_bytes()),
    };
    written.map(|()| text.len()).map_err(|_| QueueError::Closed)
}
