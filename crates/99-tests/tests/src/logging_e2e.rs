//! Gateway output routed through the log channels.

use std::sync::Arc;
use std::thread;

use runtime_native::{
    run_gateway, BridgeClient, BridgeContext, BufferResult, LogStream, QueueError,
    SimulatedGateway, Timeout, STDERR_FD, STDOUT_FD,
};

use crate::support::{echo_client, slot, start, wait_for};

fn read_info(client: &BridgeClient) -> BufferResult {
    let got = slot();
    {
        let got = Arc::clone(&got);
        let buf = vec![0u8; client.log_max_msg_size()];
        client
            .log_info_message(buf, Timeout::Block, move |result, buf| {
                *got.lock() = Some((result, buf))
            })
            .unwrap();
    }
    wait_for(client, &got)
}

#[test]
fn gateway_announces_itself_on_info_stream() {
    let client = echo_client();
    client.start_logging();
    let exit = start(&client, None);

    let (result, buf) = read_info(&client);
    let n = result.unwrap();
    assert_eq!(&buf[..n], b"Waiting for stop");

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));

    let (result, _) = read_info(&client);
    assert_eq!(result, Err(QueueError::Closed), "drained channel closes");
    client.shutdown();
}

#[test]
fn stop_logging_ends_log_streams() {
    let client = echo_client();
    client.start_logging();
    client.start_logging();
    let exit = start(&client, None);

    let (result, _) = read_info(&client);
    assert!(result.is_ok());

    client.stop_logging();
    let (result, _) = read_info(&client);
    assert_eq!(result.unwrap_err().errno(), libc::EBADF);

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));
    client.shutdown();
}

#[test]
fn reset_logging_rearms_channels() {
    let client = echo_client();
    client.start_logging();
    client.stop_logging();
    client.reset_logging();
    client.start_logging();

    let logger = client.context().logger();
    assert_eq!(logger.write_fd(STDOUT_FD, format_args!("again")), Ok(5));
    let (result, buf) = read_info(&client);
    assert_eq!(result, Ok(5));
    assert_eq!(&buf[..5], b"again");
    client.shutdown();
}

#[test]
fn error_stream_and_truncation() {
    let client = echo_client();
    client.start_logging();
    client.set_log_max_msg_size(8);

    let logger = client.context().logger();
    assert_eq!(
        logger.write_fd(STDERR_FD, format_args!("{} is longer than eight", "this")),
        Ok(8)
    );
    assert!(matches!(
        logger.write_fd(0, format_args!("stdin?")),
        Err(QueueError::InvalidArgument(_))
    ));

    let message = logger
        .channel(LogStream::Error)
        .read_message(Timeout::Poll)
        .unwrap();
    assert_eq!(message.as_bytes(), b"this is ");
    client.shutdown();
}

#[test]
fn log_text_written_during_shutdown_is_drained() {
    let ctx = Arc::new(BridgeContext::new());
    ctx.logger().start_logging();
    ctx.stop_signal().request();

    let reader = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || ctx.log_messages(LogStream::Info).collect::<Vec<_>>())
    };
    run_gateway(&ctx, &SimulatedGateway::default(), None).unwrap();
    assert_eq!(reader.join().unwrap(), ["Waiting for stop"]);
}
