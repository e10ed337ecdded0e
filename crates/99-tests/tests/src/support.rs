//! Shared gateways and client helpers for the end-to-end tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use parking_lot::Mutex;
use runtime_native::{
    BridgeClient, BridgeConfig, BridgeContext, Direction, Gateway, QueueError, QueueResult,
    SimulatedGateway, TimeVal, PROTOCOL_VERSION, SEND_TO_BUFLEN,
};

pub const PUSH_DATA: u8 = 0;
pub const PULL_DATA: u8 = 2;
pub const PULL_RESP: u8 = 3;
pub const TX_ACK: u8 = 5;

pub const GATEWAY_EUI: u64 = 0x0016_C001_FF10_A235;

/// Gateway that transmits every `PULL_RESP` it is given and hears its own
/// transmission back as a `PUSH_DATA`.
///
/// It announces itself with one `PULL_DATA`, acknowledges each `PULL_RESP`
/// with a `TX_ACK` carrying the same token, then forwards the payload on the
/// uplink behind a 12-byte header. A closed link ends the run cleanly.
pub struct EchoGateway;

impl Gateway for EchoGateway {
    fn start(&self, ctx: &BridgeContext, config_dir: Option<&Path>) -> anyhow::Result<()> {
        if config_dir.is_some_and(|dir| !dir.is_dir()) {
            bail!("failed");
        }
        match serve(ctx) {
            Ok(()) | Err(QueueError::Closed) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn serve(ctx: &BridgeContext) -> QueueResult<()> {
    ctx.logger().info(format_args!("Waiting for stop"))?;

    let uplink = ctx.links().link(Direction::Uplink);
    let downlink = ctx.links().link(Direction::Downlink);
    let announce = SimulatedGateway::new(GATEWAY_EUI, Duration::from_secs(1));
    downlink.gateway_send(&announce.pull_data(0))?;

    let mut buf = vec![0u8; SEND_TO_BUFLEN];
    while !ctx.stop_signal().is_requested() {
        let n = match downlink.gateway_receive(&mut buf) {
            Ok(n) => n,
            Err(QueueError::WouldBlock) => continue,
            Err(err) => return Err(err),
        };
        if n < 4 || buf[0] != PROTOCOL_VERSION || buf[3] != PULL_RESP {
            ctx.logger()
                .error(format_args!("ignoring {n} byte downlink frame"))?;
            continue;
        }

        downlink.gateway_send(&[PROTOCOL_VERSION, buf[1], buf[2], TX_ACK])?;

        let mut push = Vec::with_capacity(12 + n - 4);
        push.extend_from_slice(&[PROTOCOL_VERSION, buf[1], buf[2], PUSH_DATA]);
        push.extend_from_slice(&GATEWAY_EUI.to_be_bytes());
        push.extend_from_slice(&buf[4..n]);
        uplink.gateway_send(&push)?;
    }
    Ok(())
}

/// Configuration whose gateway receives poll often enough to notice a stop.
pub fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.worker_threads = 6;
    for link in [&mut config.uplink, &mut config.downlink] {
        link.gateway_recv_timeout = TimeVal { secs: 0, micros: 5_000 };
    }
    config
}

pub fn echo_client() -> BridgeClient {
    BridgeClient::new(Arc::new(EchoGateway), &test_config()).unwrap()
}

/// Value filled in by a callback.
pub type Slot<T> = Arc<Mutex<Option<T>>>;

pub fn slot<T>() -> Slot<T> {
    Arc::new(Mutex::new(None))
}

/// Dispatches callbacks until `slot` is filled.
pub fn wait_for<T>(client: &BridgeClient, slot: &Slot<T>) -> T {
    for _ in 0..100 {
        client.dispatch_timeout(Duration::from_millis(100));
        if let Some(value) = slot.lock().take() {
            return value;
        }
    }
    panic!("callback did not run within 10s");
}

/// Starts the gateway and returns the slot its exit message lands in.
pub fn start(client: &BridgeClient, config_dir: Option<PathBuf>) -> Slot<Result<(), String>> {
    let exit = slot();
    let done = Arc::clone(&exit);
    client
        .start(config_dir, move |result| {
            *done.lock() = Some(result.map_err(|err| err.to_string()))
        })
        .unwrap();
    exit
}
