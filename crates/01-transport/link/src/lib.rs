//! Bidirectional frame links between the gateway and its consumer.
//!
//! * [`Link`] – outbound and inbound [`link_queue::BoundedQueue`] pair for one
//!   direction, with the gateway-side configuration stored on the link.
//! * [`LinkTable`] – the two links, addressed through signed [`LinkId`]s.
//! * [`RECV_FROM_BUFLEN`] / [`SEND_TO_BUFLEN`] – per-direction frame ceilings.

mod direction;
mod link;
mod table;

pub use direction::{Direction, LinkId};
pub use link::{Link, RECV_FROM_BUFLEN, SEND_TO_BUFLEN};
pub use table::LinkTable;
