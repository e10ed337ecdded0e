//! Gateway lifecycle: the stop flag, the [`Gateway`] trait and the runner.

use std::path::Path;
use std::time::Duration;

use link_queue::CloseMode;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::context::BridgeContext;

/// Stop request shared between the gateway thread and whoever stops it.
#[derive(Debug, Default)]
pub struct StopSignal {
    requested: Mutex<bool>,
    changed: Condvar,
}

impl StopSignal {
    /// Creates a cleared signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the gateway to return and wakes anyone waiting.
    pub fn request(&self) {
        *self.requested.lock() = true;
        self.changed.notify_all();
    }

    /// Whether a stop has been requested since the last clear.
    pub fn is_requested(&self) -> bool {
        *self.requested.lock()
    }

    /// Waits up to `timeout` for a stop request; returns whether one arrived.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut requested = self.requested.lock();
        if !*requested {
            self.changed
                .wait_while_for(&mut requested, |requested| !*requested, timeout);
        }
        *requested
    }

    /// Blocks until a stop is requested.
    pub fn wait(&self) {
        let mut requested = self.requested.lock();
        self.changed.wait_while(&mut requested, |requested| !*requested);
    }

    /// Clears a previous request.
    pub fn clear(&self) {
        *self.requested.lock() = false;
    }
}

/// A gateway process driven by the bridge.
///
/// `start` runs on its own thread for as long as the gateway is up and
/// returns when it is stopped or fails. It talks to the consumer only through
/// the context: gateway-side link ids for frames and the logger for text.
pub trait Gateway: Send + Sync {
    /// Runs the gateway until it stops. An error is the gateway's failure exit.
    fn start(&self, ctx: &BridgeContext, config_dir: Option<&Path>) -> anyhow::Result<()>;

    /// Asks a running `start` to return.
    fn stop(&self, ctx: &BridgeContext) {
        ctx.stop_signal().request();
    }
}

/// Runs `gateway` to completion and tears down the shared channels after it.
///
/// Once `start` returns, both links close immediately so blocked consumers
/// see `Closed`, and both log channels close gracefully so text written
/// during shutdown is still readable.
pub fn run_gateway(
    ctx: &BridgeContext,
    gateway: &dyn Gateway,
    config_dir: Option<&Path>,
) -> anyhow::Result<()> {
    debug!(config_dir = ?config_dir, "gateway starting");
    let result = gateway.start(ctx, config_dir);

    ctx.links().close();
    ctx.logger().close(CloseMode::Drain);

    match &result {
        Ok(()) => debug!("gateway stopped"),
        Err(err) => error!(error = %err, "gateway failed"),
    }
    result
}
