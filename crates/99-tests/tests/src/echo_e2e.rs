//! Frames round-tripping through an echoing gateway.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runtime_native::{
    BridgeClient, Direction, HighWaterMark, SimulatedGateway, Timeout, PROTOCOL_VERSION,
    RECV_FROM_BUFLEN,
};

use crate::support::{
    echo_client, start, test_config, wait_for, GATEWAY_EUI, PULL_DATA, PULL_RESP, PUSH_DATA,
    TX_ACK,
};

const ROUNDS: usize = 50;
const PAYLOAD_SIZE: usize = 32;

fn recv(client: &BridgeClient, direction: Direction) -> Vec<u8> {
    let (result, mut buf) = client
        .recv_from_async(direction.as_raw(), vec![0u8; RECV_FROM_BUFLEN], Timeout::Block)
        .wait()
        .unwrap();
    buf.truncate(result.unwrap());
    buf
}

fn echo(hwm: HighWaterMark) {
    let client = echo_client();
    let exit = start(&client, None);

    let hello = recv(&client, Direction::Downlink);
    assert_eq!(hello.len(), 12);
    assert_eq!(hello[3], PULL_DATA);
    assert_eq!(&hello[4..], &GATEWAY_EUI.to_be_bytes());

    let mut rng = StdRng::seed_from_u64(0x10AA);
    for _ in 0..ROUNDS {
        let token: u16 = rng.gen();
        let mut payload = [0u8; PAYLOAD_SIZE];
        rng.fill(&mut payload[..]);

        let [hi, lo] = token.to_be_bytes();
        let mut frame = vec![PROTOCOL_VERSION, hi, lo, PULL_RESP];
        frame.extend_from_slice(&payload);
        let (result, _) = client
            .send_to_async(Direction::Downlink.as_raw(), frame, hwm, Timeout::Block)
            .wait()
            .unwrap();
        assert_eq!(result, Ok(4 + PAYLOAD_SIZE));

        let tx_ack = recv(&client, Direction::Downlink);
        assert_eq!(tx_ack, [PROTOCOL_VERSION, hi, lo, TX_ACK]);

        let push = recv(&client, Direction::Uplink);
        assert_eq!(push[3], PUSH_DATA);
        assert_eq!(&push[1..3], &[hi, lo]);
        assert_eq!(&push[12..], &payload);
    }

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));
    client.shutdown();
}

#[test]
fn echo_receives_same_data_sent() {
    echo(HighWaterMark::Unbounded);
}

#[test]
fn echo_with_high_water_mark_one() {
    echo(HighWaterMark::Bytes(1));
}

#[test]
fn simulated_gateway_keepalives_reach_consumer() {
    let gateway = Arc::new(SimulatedGateway::new(GATEWAY_EUI, Duration::from_millis(1)));
    let client = BridgeClient::new(gateway, &test_config()).unwrap();
    let exit = start(&client, None);

    let mut tokens = Vec::new();
    for _ in 0..5 {
        let keepalive = recv(&client, Direction::Downlink);
        assert_eq!(keepalive.len(), 12);
        assert_eq!(keepalive[0], PROTOCOL_VERSION);
        assert_eq!(keepalive[3], PULL_DATA);
        tokens.push(u16::from_be_bytes([keepalive[1], keepalive[2]]));
    }
    assert!(
        tokens.windows(2).any(|pair| pair[0] != pair[1]),
        "tokens are random"
    );

    client.stop();
    assert_eq!(wait_for(&client, &exit), Ok(()));
    client.shutdown();
}
