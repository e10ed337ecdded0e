//! Stand-in gateway that needs no radio hardware.
//!
//! [`SimulatedGateway`] behaves like a packet forwarder with no traffic: it
//! announces itself on the info stream and emits a `PULL_DATA` keepalive on
//! the downlink at a fixed interval until it is stopped.

use std::path::Path;
use std::time::Duration;

use anyhow::bail;
use link_queue::QueueError;
use link_table::Direction;
use rand::Rng;
use tracing::{debug, trace};

use crate::context::BridgeContext;
use crate::gateway::Gateway;

/// Semtech UDP protocol version carried in every header.
pub const PROTOCOL_VERSION: u8 = 2;
/// Identifier of the keepalive the gateway sends on the downlink.
pub const PULL_DATA: u8 = 2;
/// Length of a `PULL_DATA` frame: header plus gateway EUI.
pub const PULL_DATA_LEN: usize = 12;

/// Default interval between keepalives.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(10);

/// Gateway that only logs and sends keepalives.
#[derive(Clone, Debug)]
pub struct SimulatedGateway {
    gateway_eui: u64,
    keepalive: Duration,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(0xAA55_5A00_0000_0101, DEFAULT_KEEPALIVE)
    }
}

impl SimulatedGateway {
    /// Creates a gateway with the given EUI and keepalive interval.
    pub fn new(gateway_eui: u64, keepalive: Duration) -> Self {
        Self {
            gateway_eui,
            keepalive,
        }
    }

    /// EUI reported in keepalives.
    pub fn gateway_eui(&self) -> u64 {
        self.gateway_eui
    }

    /// Builds one keepalive frame with the given token.
    pub fn pull_data(&self, token: u16) -> [u8; PULL_DATA_LEN] {
        let mut frame = [0u8; PULL_DATA_LEN];
        frame[0] = PROTOCOL_VERSION;
        frame[1..3].copy_from_slice(&token.to_be_bytes());
        frame[3] = PULL_DATA;
        frame[4..].copy_from_slice(&self.gateway_eui.to_be_bytes());
        frame
    }
}

impl Gateway for SimulatedGateway {
    fn start(&self, ctx: &BridgeContext, config_dir: Option<&Path>) -> anyhow::Result<()> {
        if let Some(dir) = config_dir {
            if !dir.is_dir() {
                ctx.logger().error(format_args!(
                    "configuration directory {} not found\n",
                    dir.display()
                ))?;
                bail!("failed");
            }
        }

        ctx.logger().info(format_args!("Waiting for stop"))?;
        let downlink = ctx.links().link(Direction::Downlink);
        let mut rng = rand::thread_rng();

        while !ctx.stop_signal().wait_timeout(self.keepalive) {
            let token: u16 = rng.gen();
            match downlink.gateway_send(&self.pull_data(token)) {
                Ok(_) => trace!(token, "keepalive sent"),
                Err(QueueError::WouldBlock) => trace!(token, "keepalive dropped"),
                Err(QueueError::Closed) => {
                    debug!("downlink closed, gateway exiting");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
