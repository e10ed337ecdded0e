//! Failures surfaced to the consumer, with their errno values.

use std::path::PathBuf;
use std::sync::Arc;

use runtime_native::{Direction, HighWaterMark, QueueError, Timeout, SEND_TO_BUFLEN};

use crate::support::{echo_client, slot, start, wait_for, PULL_DATA};

#[test]
fn missing_configuration_directory_fails_start() {
    let client = echo_client();
    let exit = start(&client, Some(PathBuf::from("/nonexistent/foobar")));
    assert_eq!(wait_for(&client, &exit), Err("failed".to_string()));
    client.shutdown();
}

#[test]
fn read_on_unknown_link_is_einval() {
    let client = echo_client();
    let exit = start(&client, None);

    let (result, _) = client
        .recv_from_async(999, vec![0u8; 16], Timeout::Block)
        .wait()
        .unwrap();
    assert_eq!(result.unwrap_err().errno(), libc::EINVAL);

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));
    client.shutdown();
}

#[test]
fn write_on_unknown_link_is_einval() {
    let client = echo_client();
    let got = slot();
    {
        let got = Arc::clone(&got);
        client
            .send_to(
                999,
                b"foobar".to_vec(),
                HighWaterMark::Unbounded,
                Timeout::Block,
                move |result, _| *got.lock() = Some(result),
            )
            .unwrap();
    }
    let err = wait_for(&client, &got).unwrap_err();
    assert!(matches!(err, QueueError::InvalidArgument(_)));
    assert_eq!(err.errno(), libc::EINVAL);
    client.shutdown();
}

#[test]
fn oversized_frame_is_partially_written() {
    let client = echo_client();
    let (result, buf) = client
        .send_to_async(
            Direction::Downlink.as_raw(),
            vec![0u8; SEND_TO_BUFLEN + 1],
            HighWaterMark::Unbounded,
            Timeout::Poll,
        )
        .wait()
        .unwrap();
    assert_eq!(result, Ok(SEND_TO_BUFLEN));
    assert_eq!(buf.len(), SEND_TO_BUFLEN + 1, "caller's buffer is untouched");
    client.shutdown();
}

#[test]
fn write_after_stop_is_ebadf() {
    let client = echo_client();
    let exit = start(&client, None);
    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));

    let (result, _) = client
        .send_to_async(
            Direction::Downlink.as_raw(),
            b"foo".to_vec(),
            HighWaterMark::Unbounded,
            Timeout::Block,
        )
        .wait()
        .unwrap();
    assert_eq!(result, Err(QueueError::Closed));
    assert_eq!(QueueError::Closed.errno(), libc::EBADF);
    client.shutdown();
}

#[test]
fn reset_allows_a_second_run() {
    let client = echo_client();
    let exit = start(&client, None);
    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));

    client.reset();
    let exit = start(&client, None);
    let (result, buf) = client
        .recv_from_async(Direction::Downlink.as_raw(), vec![0u8; 64], Timeout::Block)
        .wait()
        .unwrap();
    assert_eq!(result, Ok(12), "fresh run announces itself again");
    assert_eq!(buf[3], PULL_DATA);

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));
    client.shutdown();
}

#[test]
fn starting_twice_stops_both() {
    let client = echo_client();
    let first = start(&client, None);
    let second = start(&client, None);

    client.stop();
    assert_eq!(wait_for(&client, &first), Ok(()));
    assert_eq!(wait_for(&client, &second), Ok(()));
    client.shutdown();
}
