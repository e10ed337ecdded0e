//! Network sink for the gateway link bridge.
//!
//! Starts the simulated gateway, pipes its info and error output to stdout
//! and stderr, and prints every frame it forwards. With `--ack` the sink
//! answers `PUSH_DATA` on the uplink and `PULL_DATA` on the downlink with the
//! matching 4-byte acknowledgement header.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use runtime_native::{
    run_gateway, BridgeConfig, BridgeContext, Direction, Gateway, HighWaterMark, LogStream,
    SimulatedGateway, Timeout, RECV_FROM_BUFLEN,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Receives gateway frames and optionally acknowledges them")]
struct Args {
    /// Gateway configuration directory; start fails if it does not exist
    #[arg(short = 'c', long)]
    cfg_dir: Option<PathBuf>,

    /// Reply to PUSH_DATA / PULL_DATA with PUSH_ACK / PULL_ACK
    #[arg(long)]
    ack: bool,

    /// Interval between simulated PULL_DATA keepalives
    #[arg(long, default_value_t = 10_000)]
    keepalive_ms: u64,

    /// Stop the gateway after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    run_for_secs: Option<u64>,

    /// Longest gateway log message, in bytes
    #[arg(long, default_value_t = 1024)]
    max_msg_size: usize,
}

fn main() -> Result<()> {
    init_tracing();

    let Args {
        cfg_dir,
        ack,
        keepalive_ms,
        run_for_secs,
        max_msg_size,
    } = Args::parse();

    let ctx = Arc::new(BridgeContext::new());
    let mut config = BridgeConfig::default();
    config.log.max_message_size = max_msg_size;
    config.apply(&ctx);

    let gateway = Arc::new(SimulatedGateway::new(
        SimulatedGateway::default().gateway_eui(),
        Duration::from_millis(keepalive_ms),
    ));

    {
        let ctx = Arc::clone(&ctx);
        let gateway = Arc::clone(&gateway);
        ctrlc::set_handler(move || gateway.stop(&ctx))
            .context("failed to install Ctrl+C handler")?;
    }

    ctx.logger().start_logging();
    let mut workers = vec![
        spawn_log_pump(&ctx, LogStream::Info)?,
        spawn_log_pump(&ctx, LogStream::Error)?,
    ];
    for direction in Direction::ALL {
        workers.push(spawn_sink(&ctx, direction, ack)?);
    }

    if let Some(secs) = run_for_secs {
        let ctx = Arc::clone(&ctx);
        let gateway = Arc::clone(&gateway);
        thread::Builder::new()
            .name("stop-timer".into())
            .spawn(move || {
                thread::sleep(Duration::from_secs(secs));
                gateway.stop(&ctx);
            })
            .context("failed to spawn stop timer")?;
    }

    info!(cfg_dir = ?cfg_dir, ack, "starting gateway");
    let result = run_gateway(&ctx, gateway.as_ref(), cfg_dir.as_deref());

    for worker in workers {
        if worker.join().is_err() {
            warn!("sink thread panicked");
        }
    }
    println!("stopped");
    result.context("gateway exited with failure")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn spawn_log_pump(ctx: &Arc<BridgeContext>, stream: LogStream) -> Result<JoinHandle<()>> {
    let ctx = Arc::clone(ctx);
    thread::Builder::new()
        .name(format!("log-{stream}"))
        .spawn(move || {
            for message in ctx.log_messages(stream) {
                let line = message.trim_end_matches('\n');
                match stream {
                    LogStream::Info => println!("{line}"),
                    LogStream::Error => eprintln!("{line}"),
                }
            }
        })
        .with_context(|| format!("failed to spawn {stream} log pump"))
}

fn spawn_sink(
    ctx: &Arc<BridgeContext>,
    direction: Direction,
    ack: bool,
) -> Result<JoinHandle<()>> {
    let ctx = Arc::clone(ctx);
    thread::Builder::new()
        .name(format!("sink-{direction}"))
        .spawn(move || {
            for frame in ctx.frames(direction, RECV_FROM_BUFLEN, Timeout::Block) {
                if !ack {
                    println!("{direction} got packet {} bytes long", frame.len());
                    continue;
                }

                let reply = match protocol::acknowledge(direction, &frame) {
                    Ok(reply) => reply,
                    Err(reason) => {
                        println!(" -> pkt in, {direction}, {} bytes ({reason})", frame.len());
                        continue;
                    }
                };
                println!(
                    " -> pkt in, {direction}, {} bytes, {} from gateway {:016x}",
                    frame.len(),
                    protocol::data_name(direction),
                    protocol::gateway_eui(&frame),
                );
                let sent = ctx.links().send_to(
                    direction.as_raw(),
                    &reply,
                    HighWaterMark::Unbounded,
                    Timeout::Block,
                );
                match sent {
                    Ok(n) => {
                        println!("<-  pkt out, {}, {n} bytes sent", protocol::ack_name(direction))
                    }
                    Err(err) => {
                        warn!(%direction, %err, "acknowledgement not sent");
                        break;
                    }
                }
            }
        })
        .with_context(|| format!("failed to spawn {direction} sink"))
}

/// Header checks and acknowledgements for the gateway's UDP protocol.
mod protocol {
    use runtime_native::{Direction, PROTOCOL_VERSION, PULL_DATA, PULL_DATA_LEN};

    const PUSH_DATA: u8 = 0;
    const PUSH_ACK: u8 = 1;
    const PULL_ACK: u8 = 4;

    /// Shortest frame that carries a full header and gateway EUI.
    const MIN_FRAME_LEN: usize = PULL_DATA_LEN;

    fn expected_data(direction: Direction) -> u8 {
        match direction {
            Direction::Uplink => PUSH_DATA,
            Direction::Downlink => PULL_DATA,
        }
    }

    pub fn data_name(direction: Direction) -> &'static str {
        match direction {
            Direction::Uplink => "PUSH_DATA",
            Direction::Downlink => "PULL_DATA",
        }
    }

    pub fn ack_name(direction: Direction) -> &'static str {
        match direction {
            Direction::Uplink => "PUSH_ACK",
            Direction::Downlink => "PULL_ACK",
        }
    }

    /// Gateway EUI from a frame already accepted by [`acknowledge`].
    pub fn gateway_eui(frame: &[u8]) -> u64 {
        let mut eui = [0u8; 8];
        eui.copy_from_slice(&frame[4..MIN_FRAME_LEN]);
        u64::from_be_bytes(eui)
    }

    /// Builds the 4-byte acknowledgement for `frame`, echoing its token.
    pub fn acknowledge(direction: Direction, frame: &[u8]) -> Result<[u8; 4], String> {
        if frame.len() < MIN_FRAME_LEN {
            return Err("too short for GW <-> MAC protocol".into());
        }
        if frame[0] != PROTOCOL_VERSION {
            return Err(format!("invalid version {}", frame[0]));
        }
        if frame[3] != expected_data(direction) {
            return Err(format!("unexpected command {}", frame[3]));
        }
        let ack = match direction {
            Direction::Uplink => PUSH_ACK,
            Direction::Downlink => PULL_ACK,
        };
        Ok([frame[0], frame[1], frame[2], ack])
    }

}
