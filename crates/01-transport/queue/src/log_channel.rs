//! Bounded queue specialised for formatted diagnostic text.
//!
//! A log channel renders `format_args!` output into a buffer capped at the
//! configured maximum message size and enqueues it with the channel's own
//! write high-water mark and timeout. Unlike frame queues, a log channel can
//! be closed gracefully: text written before the close is still delivered,
//! once and in order, and the first read that finds nothing left closes the
//! channel for good.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{QueueError, QueueResult};
use crate::message::Message;
use crate::queue::{BoundedQueue, CloseMode};
use crate::wait::{AtomicHighWaterMark, AtomicTimeout, HighWaterMark, Timeout};

/// Default cap on a single rendered log message, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024;

/// Draining queue of rendered log messages plus its write configuration.
#[derive(Debug)]
pub struct LogChannel {
    queue: BoundedQueue,
    max_message_size: AtomicUsize,
    write_hwm: AtomicHighWaterMark,
    write_timeout: AtomicTimeout,
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LogChannel {
    /// Creates an open channel with the default configuration.
    pub fn new() -> Self {
        Self {
            queue: BoundedQueue::draining(),
            max_message_size: AtomicUsize::new(DEFAULT_MAX_MESSAGE_SIZE),
            write_hwm: AtomicHighWaterMark::new(HighWaterMark::Unbounded),
            write_timeout: AtomicTimeout::new(Timeout::Block),
        }
    }

    /// Renders `args` and enqueues the result, returning the bytes accepted.
    ///
    /// Text longer than [`LogChannel::max_message_size`] is truncated. Output
    /// that renders to nothing is not enqueued and reports zero bytes.
    pub fn write(&self, args: fmt::Arguments<'_>) -> QueueResult<usize> {
        let mut rendered = CappedBuffer::new(self.max_message_size());
        fmt::write(&mut rendered, args)
            .map_err(|_| QueueError::InvalidArgument("log message could not be formatted"))?;

        if rendered.total == 0 {
            return Ok(0);
        }

        self.queue.enqueue(
            Message::from(rendered.bytes),
            self.write_hwm.load(),
            self.write_timeout.load(),
        )
    }

    /// Enqueues `text` as one message.
    pub fn write_str(&self, text: &str) -> QueueResult<usize> {
        self.write(format_args!("{text}"))
    }

    /// Reads the next message into `buf`, returning the bytes copied.
    pub fn read(&self, buf: &mut [u8], timeout: Timeout) -> QueueResult<usize> {
        self.queue.dequeue_into(buf, timeout)
    }

    /// Reads the next message.
    pub fn read_message(&self, timeout: Timeout) -> QueueResult<Message> {
        self.queue.dequeue(timeout)
    }

    /// Closes the channel, discarding buffered text only for
    /// [`CloseMode::Immediate`] or when nothing is buffered.
    pub fn close(&self, mode: CloseMode) {
        self.queue.close(mode);
    }

    /// Re-arms the channel after a close.
    pub fn reset(&self) {
        self.queue.reset();
    }

    /// Underlying queue, for observers.
    pub fn queue(&self) -> &BoundedQueue {
        &self.queue
    }

    /// Longest message [`LogChannel::write`] enqueues, in bytes.
    pub fn max_message_size(&self) -> usize {
        self.max_message_size.load(Ordering::Relaxed)
    }

    /// Changes the cap for messages written from now on.
    pub fn set_max_message_size(&self, size: usize) {
        self.max_message_size.store(size, Ordering::Relaxed);
    }

    /// High-water mark writers wait on.
    pub fn write_hwm(&self) -> HighWaterMark {
        self.write_hwm.load()
    }

    /// Sets the writer high-water mark.
    pub fn set_write_hwm(&self, hwm: HighWaterMark) {
        self.write_hwm.store(hwm);
    }

    /// How long a writer may wait for room.
    pub fn write_timeout(&self) -> Timeout {
        self.write_timeout.load()
    }

    /// Sets the writer timeout.
    pub fn set_write_timeout(&self, timeout: Timeout) {
        self.write_timeout.store(timeout);
    }
}

/// `fmt::Write` sink that keeps the first `cap` bytes and counts the rest.
struct CappedBuffer {
    bytes: Vec<u8>,
    cap: usize,
    total: usize,
}

impl CappedBuffer {
    fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(cap.min(DEFAULT_MAX_MESSAGE_SIZE)),
            cap,
            total: 0,
        }
    }
}

impl fmt::Write for CappedBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.total += s.len();
        let room = self.cap.saturating_sub(self.bytes.len());
        let take = s.len().min(room);
        self.bytes.extend_from_slice(&s.as_bytes()[..take]);
        Ok(())
    }
}
