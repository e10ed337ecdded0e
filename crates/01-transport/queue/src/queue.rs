//! Bounded, blocking FIFO of opaque messages.
//!
//! Every queue owns one mutex guarding the message sequence, the byte
//! counter and the two lifecycle flags, plus two condition variables: one
//! parks producers waiting for capacity, the other parks consumers waiting
//! for data. Waits release the mutex while parked.
//!
//! What a consumer does when it finds the queue empty is the only behaviour
//! that differs between frame queues and log channels, so it is selected by
//! [`EmptyWait`] rather than by a separate type.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::error::{QueueError, QueueResult};
use crate::message::Message;
use crate::wait::{HighWaterMark, Timeout};

/// Consumer behaviour on an empty queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyWait {
    /// Wait according to the caller's timeout.
    #[default]
    Plain,
    /// Wait like `Plain` until a drain close is pending; from then on an
    /// empty queue closes itself instead of waiting.
    Draining,
}

/// How [`BoundedQueue::close`] treats buffered messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseMode {
    /// Discard everything and close now.
    Immediate,
    /// Keep buffered messages readable and close once they are consumed.
    /// Plain queues always close immediately.
    Drain,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<Message>,
    size: usize,
    closed: bool,
    close_pending: bool,
}

impl QueueState {
    fn close_now(&mut self) {
        self.messages.clear();
        self.size = 0;
        self.closed = true;
    }
}

/// Thread-safe FIFO with byte accounting and high-water-mark gating.
#[derive(Debug, Default)]
pub struct BoundedQueue {
    state: Mutex<QueueState>,
    not_full: Condvar,
    not_empty: Condvar,
    empty_wait: EmptyWait,
}

impl BoundedQueue {
    /// Creates an open, empty queue that always waits on empty.
    pub fn new() -> Self {
        Self::with_empty_wait(EmptyWait::Plain)
    }

    /// Creates an open, empty queue that supports graceful drain.
    pub fn draining() -> Self {
        Self::with_empty_wait(EmptyWait::Draining)
    }

    /// Creates an open, empty queue with the given empty-wait behaviour.
    pub fn with_empty_wait(empty_wait: EmptyWait) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            empty_wait,
        }
    }

    /// Empty-wait behaviour chosen at construction.
    pub fn empty_wait(&self) -> EmptyWait {
        self.empty_wait
    }

    /// Appends `msg`, returning the number of bytes accepted.
    ///
    /// With a byte high-water mark the producer waits, per `timeout`, while
    /// the buffered size is at or above the mark. [`HighWaterMark::Discard`]
    /// accepts nothing and reports zero bytes.
    pub fn enqueue(
        &self,
        msg: Message,
        hwm: HighWaterMark,
        timeout: Timeout,
    ) -> QueueResult<usize> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(QueueError::Closed);
        }

        match hwm {
            HighWaterMark::Discard => {
                trace!(len = msg.len(), "high-water mark is zero, message dropped");
                return Ok(0);
            }
            HighWaterMark::Bytes(limit) if state.size >= limit => {
                wait_for(&self.not_full, &mut state, timeout, |s| s.size < limit)?;
            }
            HighWaterMark::Bytes(_) | HighWaterMark::Unbounded => {}
        }

        let len = msg.len();
        state.size += len;
        state.messages.push_back(msg);
        self.not_empty.notify_all();
        Ok(len)
    }

    /// Removes and returns the front message, waiting per `timeout` if empty.
    pub fn dequeue(&self, timeout: Timeout) -> QueueResult<Message> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(QueueError::Closed);
        }

        if state.messages.is_empty() {
            self.wait_not_empty(&mut state, timeout)?;
        }

        let msg = state.messages.pop_front().ok_or(QueueError::WouldBlock)?;
        state.size -= msg.len();
        self.not_full.notify_all();
        Ok(msg)
    }

    /// Dequeues into `buf`, returning the number of bytes copied.
    ///
    /// Bytes beyond `buf.len()` are dropped rather than kept for a later read.
    pub fn dequeue_into(&self, buf: &mut [u8], timeout: Timeout) -> QueueResult<usize> {
        let msg = self.dequeue(timeout)?;
        Ok(msg.copy_to(buf))
    }

    /// Closes the queue and wakes every waiter.
    pub fn close(&self, mode: CloseMode) {
        let mut state = self.state.lock();
        let draining = self.empty_wait == EmptyWait::Draining;

        if draining {
            state.close_pending = true;
        }

        if !draining || mode == CloseMode::Immediate || state.messages.is_empty() {
            state.close_now();
            debug!(?mode, "queue closed");
        } else {
            debug!(
                pending = state.messages.len(),
                bytes = state.size,
                "queue draining"
            );
        }

        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Re-arms a closed queue. Buffered messages are left untouched.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.closed = false;
        state.close_pending = false;
        debug!("queue reset");
    }

    /// Sum of the lengths of the buffered messages.
    pub fn size(&self) -> usize {
        self.state.lock().size
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    /// Whether no messages are buffered.
    pub fn is_empty(&self) -> bool {
        self.state.lock().messages.is_empty()
    }

    /// Whether the queue rejects all operations.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Whether a close has been requested (drained or not yet).
    pub fn is_close_pending(&self) -> bool {
        self.state.lock().close_pending
    }

    fn wait_not_empty(
        &self,
        state: &mut MutexGuard<'_, QueueState>,
        timeout: Timeout,
    ) -> QueueResult<()> {
        let draining = self.empty_wait == EmptyWait::Draining;

        if !(draining && state.close_pending) {
            wait_for(&self.not_empty, state, timeout, |s| {
                !s.messages.is_empty() || (draining && s.close_pending)
            })?;
        }

        if state.messages.is_empty() {
            // Only reachable once a drain close is pending.
            state.closed = true;
            self.not_full.notify_all();
            self.not_empty.notify_all();
            trace!("drained queue closed");
            return Err(QueueError::Closed);
        }

        Ok(())
    }
}

/// Parks on `cv` until `ready` holds or the queue closes, bounded by `timeout`.
///
/// Closure wins over expiry: a queue that closed during the wait reports
/// [`QueueError::Closed`] even if the deadline also passed.
fn wait_for<F>(
    cv: &Condvar,
    state: &mut MutexGuard<'_, QueueState>,
    timeout: Timeout,
    ready: F,
) -> QueueResult<()>
where
    F: Fn(&QueueState) -> bool,
{
    match timeout {
        Timeout::Block => cv.wait_while(state, |s| !s.closed && !ready(s)),
        Timeout::Poll => {}
        Timeout::After(duration) => {
            cv.wait_while_for(state, |s| !s.closed && !ready(s), duration);
        }
    }

    if state.closed {
        return Err(QueueError::Closed);
    }
    if !ready(&**state) {
        return Err(QueueError::WouldBlock);
    }
    Ok(())
}
