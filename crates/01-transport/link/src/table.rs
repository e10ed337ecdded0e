//! Both links, addressed by signed identifier.

use link_queue::{HighWaterMark, QueueResult, Timeout};

use crate::direction::{Direction, LinkId};
use crate::link::Link;

/// The two links, addressed by direction or by signed link identifier.
#[derive(Debug)]
pub struct LinkTable {
    links: [Link; 2],
}

impl Default for LinkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkTable {
    /// Creates both links, open and with default configuration.
    pub fn new() -> Self {
        Self {
            links: Direction::ALL.map(Link::new),
        }
    }

    /// Link carrying `direction`.
    pub fn link(&self, direction: Direction) -> &Link {
        &self.links[direction.index()]
    }

    /// Both links, uplink first.
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// Receives a frame from the queue named by `link`.
    ///
    /// Consumer ids read the link's outbound queue with `timeout`. Gateway ids
    /// read the inbound queue with the link's configured receive timeout and
    /// ignore `timeout`.
    pub fn receive_from(
        &self,
        link: i32,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> QueueResult<usize> {
        match LinkId::from_raw(link)? {
            LinkId::Consumer(direction) => self.link(direction).receive(buf, timeout),
            LinkId::Gateway(direction) => self.link(direction).gateway_receive(buf),
        }
    }

    /// Sends a frame into the queue named by `link`.
    ///
    /// Consumer ids write the inbound queue with `hwm` and `timeout`. Gateway
    /// ids write the outbound queue with the link's configured send
    /// high-water mark and timeout and ignore the arguments.
    pub fn send_to(
        &self,
        link: i32,
        payload: &[u8],
        hwm: HighWaterMark,
        timeout: Timeout,
    ) -> QueueResult<usize> {
        match LinkId::from_raw(link)? {
            LinkId::Consumer(direction) => self.link(direction).send(payload, hwm, timeout),
            LinkId::Gateway(direction) => self.link(direction).gateway_send(payload),
        }
    }

    /// Resets both links to their defaults.
    pub fn reset(&self) {
        self.links.iter().for_each(Link::reset);
    }

    /// Closes both links immediately.
    pub fn close(&self) {
        self.links.iter().for_each(Link::close);
    }
}
