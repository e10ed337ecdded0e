//! Poll and timed reads against an idle gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use runtime_native::{Direction, QueueError, Timeout, RECV_FROM_BUFLEN};

use crate::support::{echo_client, slot, start, wait_for};

#[test]
fn poll_for_frames_is_eagain() {
    let client = echo_client();
    let exit = start(&client, None);

    for timeout in [Timeout::Poll, Timeout::from_timeval(0, 1)] {
        let (result, _) = client
            .recv_from_async(
                Direction::Uplink.as_raw(),
                vec![0u8; RECV_FROM_BUFLEN],
                timeout,
            )
            .wait()
            .unwrap();
        let err = result.unwrap_err();
        assert_eq!(err, QueueError::WouldBlock);
        assert_eq!(err.errno(), libc::EAGAIN);
    }

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));
    client.shutdown();
}

#[test]
fn timed_read_waits_then_gives_up() {
    let client = echo_client();
    let started = Instant::now();
    let (result, _) = client
        .recv_from_async(
            Direction::Uplink.as_raw(),
            vec![0u8; RECV_FROM_BUFLEN],
            Timeout::After(Duration::from_millis(30)),
        )
        .wait()
        .unwrap();
    assert_eq!(result, Err(QueueError::WouldBlock));
    assert!(started.elapsed() >= Duration::from_millis(30));
    client.shutdown();
}

#[test]
fn poll_for_log_messages_is_eagain() {
    let client = echo_client();
    client.start_logging();

    for timeout in [Timeout::Poll, Timeout::from_timeval(0, 1)] {
        let got = slot();
        {
            let got = Arc::clone(&got);
            let buf = vec![0u8; client.log_max_msg_size()];
            client
                .log_error_message(buf, timeout, move |result, _| *got.lock() = Some(result))
                .unwrap();
        }
        assert_eq!(wait_for(&client, &got).unwrap_err().errno(), libc::EAGAIN);
    }
    client.shutdown();
}
