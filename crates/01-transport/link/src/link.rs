//! One direction's queue pair and the gateway-side settings that go with it.

use link_queue::{
    AtomicHighWaterMark, AtomicTimeout, BoundedQueue, CloseMode, HighWaterMark, Message,
    QueueResult, Timeout,
};
use tracing::debug;

use crate::direction::Direction;

const NB_PKT_MAX: usize = 8;
const STATUS_SIZE: usize = 200;
const TX_BUFF_SIZE: usize = (540 * NB_PKT_MAX) + 30 + STATUS_SIZE;
const RX_BUFF_SIZE: usize = 1000;

/// Largest frame the gateway hands to the consumer; longer frames are cut.
pub const RECV_FROM_BUFLEN: usize = TX_BUFF_SIZE;
/// Largest frame the consumer can hand to the gateway; longer frames are cut.
pub const SEND_TO_BUFLEN: usize = RX_BUFF_SIZE - 1;

/// Pair of frame queues for one direction.
///
/// `outbound` carries frames from the gateway to the consumer, `inbound` the
/// other way. The consumer passes its own high-water mark and timeouts on
/// every call; the gateway end uses the values stored on the link, which the
/// consumer configures. Links never drain: closing discards queued frames.
#[derive(Debug)]
pub struct Link {
    direction: Direction,
    outbound: BoundedQueue,
    inbound: BoundedQueue,
    gateway_send_hwm: AtomicHighWaterMark,
    gateway_send_timeout: AtomicTimeout,
    gateway_recv_timeout: AtomicTimeout,
}

impl Link {
    /// Creates an open link with unbounded, blocking gateway defaults.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            outbound: BoundedQueue::new(),
            inbound: BoundedQueue::new(),
            gateway_send_hwm: AtomicHighWaterMark::default(),
            gateway_send_timeout: AtomicTimeout::default(),
            gateway_recv_timeout: AtomicTimeout::default(),
        }
    }

    /// Direction this link carries.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Reads the next gateway frame into `buf`, returning the bytes copied.
    pub fn receive(&self, buf: &mut [u8], timeout: Timeout) -> QueueResult<usize> {
        self.outbound.dequeue_into(buf, timeout)
    }

    /// Queues a frame for the gateway, cut to [`SEND_TO_BUFLEN`] bytes.
    pub fn send(
        &self,
        payload: &[u8],
        hwm: HighWaterMark,
        timeout: Timeout,
    ) -> QueueResult<usize> {
        self.inbound
            .enqueue(Message::truncated(payload, SEND_TO_BUFLEN), hwm, timeout)
    }

    /// Gateway end: queues a frame for the consumer, cut to [`RECV_FROM_BUFLEN`].
    pub fn gateway_send(&self, payload: &[u8]) -> QueueResult<usize> {
        self.outbound.enqueue(
            Message::truncated(payload, RECV_FROM_BUFLEN),
            self.gateway_send_hwm.load(),
            self.gateway_send_timeout.load(),
        )
    }

    /// Gateway end: reads the next consumer frame into `buf`.
    pub fn gateway_receive(&self, buf: &mut [u8]) -> QueueResult<usize> {
        self.inbound.dequeue_into(buf, self.gateway_recv_timeout.load())
    }

    /// High-water mark applied to [`Link::gateway_send`].
    pub fn set_gateway_send_hwm(&self, hwm: HighWaterMark) {
        self.gateway_send_hwm.store(hwm);
    }

    /// How long [`Link::gateway_send`] may wait for room.
    pub fn set_gateway_send_timeout(&self, timeout: Timeout) {
        self.gateway_send_timeout.store(timeout);
    }

    /// How long [`Link::gateway_receive`] may wait for a frame.
    pub fn set_gateway_recv_timeout(&self, timeout: Timeout) {
        self.gateway_recv_timeout.store(timeout);
    }

    /// Current gateway send high-water mark.
    pub fn gateway_send_hwm(&self) -> HighWaterMark {
        self.gateway_send_hwm.load()
    }

    /// Current gateway send timeout.
    pub fn gateway_send_timeout(&self) -> Timeout {
        self.gateway_send_timeout.load()
    }

    /// Current gateway receive timeout.
    pub fn gateway_recv_timeout(&self) -> Timeout {
        self.gateway_recv_timeout.load()
    }

    /// Gateway-to-consumer queue.
    pub fn outbound(&self) -> &BoundedQueue {
        &self.outbound
    }

    /// Consumer-to-gateway queue.
    pub fn inbound(&self) -> &BoundedQueue {
        &self.inbound
    }

    /// Restores the default configuration and re-arms both queues.
    pub fn reset(&self) {
        self.gateway_send_hwm.store(HighWaterMark::Unbounded);
        self.gateway_send_timeout.store(Timeout::Block);
        self.gateway_recv_timeout.store(Timeout::Block);
        self.outbound.reset();
        self.inbound.reset();
        debug!(direction = %self.direction, "link reset");
    }

    /// Closes both queues immediately, waking every blocked caller.
    pub fn close(&self) {
        self.outbound.close(CloseMode::Immediate);
        self.inbound.close(CloseMode::Immediate);
        debug!(direction = %self.direction, "link closed");
    }
}
