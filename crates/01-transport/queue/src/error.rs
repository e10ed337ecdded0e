//! Error surface shared by every queue operation.
//!
//! The bridge reports three conditions and nothing else. Callers on the far
//! side of the boundary only see the POSIX code returned by
//! [`QueueError::errno`], so the variants map one-to-one onto `EBADF`,
//! `EAGAIN` and `EINVAL`.

use thiserror::Error;

/// Convenience result alias for fallible queue operations.
pub type QueueResult<T, E = QueueError> = Result<T, E>;

/// Errors surfaced by bounded queues, log channels and link addressing.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is closed (or finished draining). Only `reset` re-arms it.
    #[error("queue is closed")]
    Closed,
    /// A poll found nothing to do, or a timed wait expired.
    #[error("operation would block")]
    WouldBlock,
    /// Bad link identifier, unknown log stream or unrenderable log text.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl QueueError {
    /// POSIX error number reported across the host boundary.
    pub fn errno(&self) -> i32 {
        match self {
            QueueError::Closed => libc::EBADF,
            QueueError::WouldBlock => libc::EAGAIN,
            QueueError::InvalidArgument(_) => libc::EINVAL,
        }
    }

    /// Whether retrying the same call later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueueError::WouldBlock)
    }
}
