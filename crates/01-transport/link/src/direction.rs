//! Link directions and signed link identifiers.

use std::fmt;

use link_queue::{QueueError, QueueResult};

/// One of the two symmetric frame channels between gateway and consumer.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Packets received over the air, forwarded by the gateway.
    Uplink = 0,
    /// Packets to transmit, plus gateway keepalives and transmit acks.
    Downlink = 1,
}

impl Direction {
    /// Both directions, in index order.
    pub const ALL: [Direction; 2] = [Direction::Uplink, Direction::Downlink];

    /// Position of this direction's link in the table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Consumer-side link identifier.
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Lowercase name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Uplink => "uplink",
            Direction::Downlink => "downlink",
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = QueueError;

    fn try_from(raw: i32) -> QueueResult<Self> {
        match raw {
            0 => Ok(Direction::Uplink),
            1 => Ok(Direction::Downlink),
            _ => Err(QueueError::InvalidArgument("unknown link direction")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded signed link identifier.
///
/// Non-negative identifiers name a direction from the consumer's side;
/// `-1 - direction` names the same link from the gateway's side. Together the
/// four valid identifiers address all four queues of the two links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkId {
    /// Consumer end: receive from outbound, send into inbound.
    Consumer(Direction),
    /// Gateway end: receive from inbound, send into outbound.
    Gateway(Direction),
}

impl LinkId {
    /// Decodes a raw identifier, rejecting anything outside `[-2, 1]`.
    pub fn from_raw(raw: i32) -> QueueResult<Self> {
        if raw < 0 {
            let direction = raw
                .checked_neg()
                .and_then(|n| n.checked_sub(1))
                .ok_or(QueueError::InvalidArgument("link id out of range"))?;
            return Direction::try_from(direction)
                .map(LinkId::Gateway)
                .map_err(|_| QueueError::InvalidArgument("link id out of range"));
        }
        Direction::try_from(raw)
            .map(LinkId::Consumer)
            .map_err(|_| QueueError::InvalidArgument("link id out of range"))
    }

    /// Raw identifier, the inverse of [`LinkId::from_raw`].
    pub const fn as_raw(self) -> i32 {
        match self {
            LinkId::Consumer(direction) => direction.as_raw(),
            LinkId::Gateway(direction) => -1 - direction.as_raw(),
        }
    }

    /// Link the identifier refers to, whichever end it names.
    pub const fn direction(self) -> Direction {
        match self {
            LinkId::Consumer(direction) | LinkId::Gateway(direction) => direction,
        }
    }
}
