//! Wait policies used by the blocking queue operations.
//!
//! Both knobs cross the host boundary as signed scalars: a timeout in
//! microseconds (or a `(seconds, microseconds)` pair) and a high-water mark in
//! bytes. The typed views below decode the sign conventions once so the queue
//! code only has to match on variants. [`AtomicTimeout`] and
//! [`AtomicHighWaterMark`] hold the raw scalars for configuration that is
//! shared between threads and read without locking.

use std::sync::atomic::{AtomicI64, AtomicIsize, Ordering};
use std::time::Duration;

const BLOCK_MICROS: i64 = -1;
const MICROS_PER_SEC: i64 = 1_000_000;

/// How long a blocking operation may wait for its predicate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Timeout {
    /// Wait until the predicate holds or the queue closes.
    #[default]
    Block,
    /// Never wait; report `WouldBlock` if the predicate does not hold yet.
    Poll,
    /// Wait up to the given duration.
    After(Duration),
}

impl Timeout {
    /// Decodes a signed microsecond count: negative blocks, zero polls.
    pub fn from_micros(micros: i64) -> Self {
        match micros {
            m if m < 0 => Timeout::Block,
            0 => Timeout::Poll,
            m => Timeout::After(Duration::from_micros(m as u64)),
        }
    }

    /// Decodes a `(seconds, microseconds)` pair as passed by the host.
    ///
    /// Negative seconds are the "block forever" sentinel regardless of the
    /// microsecond part; otherwise a negative total also blocks.
    pub fn from_timeval(secs: i64, micros: i64) -> Self {
        if secs < 0 {
            return Timeout::Block;
        }
        let total = secs.saturating_mul(MICROS_PER_SEC).saturating_add(micros);
        Timeout::from_micros(total)
    }

    /// Signed microsecond encoding, the inverse of [`Timeout::from_micros`].
    pub fn as_micros(&self) -> i64 {
        match self {
            Timeout::Block => BLOCK_MICROS,
            Timeout::Poll => 0,
            Timeout::After(d) => i64::try_from(d.as_micros()).unwrap_or(i64::MAX).max(1),
        }
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            Timeout::Poll
        } else {
            Timeout::After(duration)
        }
    }
}

/// Byte ceiling applied to a producer before it may enqueue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HighWaterMark {
    /// Never wait for capacity.
    #[default]
    Unbounded,
    /// Accept nothing: the enqueue succeeds with zero bytes.
    Discard,
    /// Wait while buffered bytes are at or above the limit.
    Bytes(usize),
}

impl HighWaterMark {
    /// Decodes the signed representation: negative is unbounded, zero discards.
    pub fn from_raw(raw: isize) -> Self {
        match raw {
            r if r < 0 => HighWaterMark::Unbounded,
            0 => HighWaterMark::Discard,
            r => HighWaterMark::Bytes(r as usize),
        }
    }

    /// Signed encoding, the inverse of [`HighWaterMark::from_raw`].
    pub fn as_raw(&self) -> isize {
        match self {
            HighWaterMark::Unbounded => -1,
            HighWaterMark::Discard => 0,
            HighWaterMark::Bytes(n) => isize::try_from(*n).unwrap_or(isize::MAX),
        }
    }
}

/// Shared timeout setting, readable from any thread without a lock.
#[derive(Debug)]
pub struct AtomicTimeout(AtomicI64);

impl AtomicTimeout {
    /// Creates a cell holding `timeout`.
    pub fn new(timeout: Timeout) -> Self {
        Self(AtomicI64::new(timeout.as_micros()))
    }

    /// Current value.
    pub fn load(&self) -> Timeout {
        Timeout::from_micros(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the value; waits already in progress keep the old one.
    pub fn store(&self, timeout: Timeout) {
        self.0.store(timeout.as_micros(), Ordering::Relaxed);
    }
}

impl Default for AtomicTimeout {
    fn default() -> Self {
        Self::new(Timeout::Block)
    }
}

/// Shared high-water mark setting, readable from any thread without a lock.
#[derive(Debug)]
pub struct AtomicHighWaterMark(AtomicIsize);

impl AtomicHighWaterMark {
    /// Creates a cell holding `hwm`.
    pub fn new(hwm: HighWaterMark) -> Self {
        Self(AtomicIsize::new(hwm.as_raw()))
    }

    /// Current value.
    pub fn load(&self) -> HighWaterMark {
        HighWaterMark::from_raw(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the value.
    pub fn store(&self, hwm: HighWaterMark) {
        self.0.store(hwm.as_raw(), Ordering::Relaxed);
    }
}

impl Default for AtomicHighWaterMark {
    fn default() -> Self {
        Self::new(HighWaterMark::Unbounded)
    }
}
