//! End-to-end sender/receiver sessions over in-memory duplex pipes,
//! including simulated packet loss and a duplicate ack, mirroring how
//! the teacher's `association_test.rs` drives a full association over
//! a loopback pair rather than mocking individual chunks.

use std::time::Duration;

use rodt::{recv_max_payload_size, send_max_payload_size, Error, ReceiverConfig, SenderConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const CHANNEL_CAPACITY: usize = 1 << 16;

/// Relays fixed-size quanta from `src` to `dst`, applying `transform` to
/// each one. `transform` returns the packets that should actually reach
/// `dst` — an empty vec drops the packet, more than one duplicates it.
async fn relay<F>(mut src: DuplexStream, mut dst: DuplexStream, quantum: usize, mut transform: F)
where
    F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
{
    let mut buf = vec![0u8; quantum];
    loop {
        if src.read_exact(&mut buf).await.is_err() {
            return;
        }
        for packet in transform(&buf) {
            if dst.write_all(&packet).await.is_err() {
                return;
            }
        }
    }
}

fn seq_num(packet: &[u8]) -> u32 {
    u32::from_le_bytes([packet[0], packet[1], packet[2], packet[3]])
}

/// Builds a sender-facing and receiver-facing stream joined through a
/// relay that drops the data packet with sequence number `drop_seq` the
/// first time it is seen, then lets every later copy (the sender's
/// Go-Back-N retransmission) through untouched.
fn lossy_session(
    quantum: usize,
    drop_seq: u32,
) -> (
    impl tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
    impl tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
) {
    let (data_in, data_relay_src) = tokio::io::duplex(CHANNEL_CAPACITY);
    let (data_relay_dst, data_out) = tokio::io::duplex(CHANNEL_CAPACITY);
    let (ack_in, ack_out) = tokio::io::duplex(CHANNEL_CAPACITY);

    let mut dropped = false;
    tokio::spawn(relay(data_relay_src, data_relay_dst, quantum, move |pkt| {
        if seq_num(pkt) == drop_seq && !dropped {
            dropped = true;
            Vec::new()
        } else {
            vec![pkt.to_vec()]
        }
    }));

    let sender_stream = tokio::io::join(ack_out, data_in);
    let receiver_stream = tokio::io::join(data_out, ack_in);
    (sender_stream, receiver_stream)
}

/// Like [`lossy_session`], but duplicates the ack for `dup_seq` once
/// instead of dropping a data packet.
fn duplicate_ack_session(
    data_quantum: usize,
    dup_seq: u32,
) -> (
    impl tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
    impl tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
) {
    let (data_in, data_out) = tokio::io::duplex(CHANNEL_CAPACITY);
    let (ack_in, ack_relay_src) = tokio::io::duplex(CHANNEL_CAPACITY);
    let (ack_relay_dst, ack_out) = tokio::io::duplex(CHANNEL_CAPACITY);

    let mut duplicated = false;
    tokio::spawn(relay(ack_relay_src, ack_relay_dst, 16, move |pkt| {
        if seq_num(pkt) == dup_seq && !duplicated {
            duplicated = true;
            vec![pkt.to_vec(), pkt.to_vec()]
        } else {
            vec![pkt.to_vec()]
        }
    }));

    let sender_stream = tokio::io::join(ack_out, data_in);
    let receiver_stream = tokio::io::join(data_out, ack_in);
    (sender_stream, receiver_stream)
}

#[tokio::test]
async fn hello_over_a_clean_channel() {
    let (client, server) = tokio::io::duplex(CHANNEL_CAPACITY);

    let sender_config = SenderConfig {
        max_payload_size: 4,
        window_size: 2,
        timeout: Duration::from_secs(1),
    };
    let receiver_config = ReceiverConfig { max_payload_size: 4 };

    let receiver = tokio::spawn(rodt::recv(server, receiver_config));
    rodt::send(client, b"hello", sender_config).await.unwrap();

    let message = receiver.await.unwrap().unwrap();
    assert_eq!(
        String::from_utf8(message).unwrap().trim_end(),
        "hello"
    );
}

#[tokio::test]
async fn empty_message_round_trips() {
    let (client, server) = tokio::io::duplex(CHANNEL_CAPACITY);

    let sender_config = SenderConfig {
        max_payload_size: 8,
        window_size: 4,
        timeout: Duration::from_millis(500),
    };
    let receiver_config = ReceiverConfig { max_payload_size: 8 };

    let receiver = tokio::spawn(rodt::recv(server, receiver_config));
    rodt::send(client, b"", sender_config).await.unwrap();

    let message = receiver.await.unwrap().unwrap();
    assert_eq!(message, vec![b' '; 8]);
}

#[tokio::test]
async fn a_dropped_fragment_is_recovered_by_retransmission() {
    let (sender_stream, receiver_stream) = lossy_session(2 + rodt::HEADER_SIZE, 1);

    let sender_config = SenderConfig {
        max_payload_size: 2,
        window_size: 3,
        timeout: Duration::from_millis(200),
    };
    let receiver_config = ReceiverConfig { max_payload_size: 2 };

    let receiver = tokio::spawn(rodt::recv(receiver_stream, receiver_config));
    rodt::send(sender_stream, b"abcdef", sender_config)
        .await
        .unwrap();

    let message = receiver.await.unwrap().unwrap();
    assert_eq!(message, b"abcdef".to_vec());
}

#[tokio::test]
async fn a_duplicate_ack_does_not_confuse_the_sender() {
    let (sender_stream, receiver_stream) =
        duplicate_ack_session(4 + rodt::HEADER_SIZE, 0);

    let sender_config = SenderConfig {
        max_payload_size: 4,
        window_size: 1,
        timeout: Duration::from_millis(100),
    };
    let receiver_config = ReceiverConfig { max_payload_size: 4 };

    let receiver = tokio::spawn(rodt::recv(receiver_stream, receiver_config));
    rodt::send(sender_stream, b"XXXX", sender_config).await.unwrap();

    let message = receiver.await.unwrap().unwrap();
    assert_eq!(message, b"XXXX".to_vec());
}

#[tokio::test]
async fn a_longer_message_spanning_many_windows() {
    let (client, server) = tokio::io::duplex(CHANNEL_CAPACITY);

    let sender_config = SenderConfig {
        max_payload_size: 16,
        window_size: 8,
        timeout: Duration::from_secs(2),
    };
    let receiver_config = ReceiverConfig {
        max_payload_size: 16,
    };

    let message = vec![b'A'; 100];
    let expected = message.clone();

    let receiver = tokio::spawn(rodt::recv(server, receiver_config));
    rodt::send(client, &message, sender_config).await.unwrap();

    let fragments = (expected.len() + 16 - 1) / 16;
    let received = receiver.await.unwrap().unwrap();
    assert_eq!(received.len(), fragments * 16);
    assert!(received.starts_with(&expected));
}

#[tokio::test]
async fn handshake_rejects_a_zero_byte_negotiated_size() {
    let (mut sender_side, mut receiver_side) = tokio::io::duplex(CHANNEL_CAPACITY);

    send_max_payload_size(&mut receiver_side, 0).await.unwrap();
    let err = recv_max_payload_size(&mut sender_side).await.unwrap_err();

    assert!(matches!(err, Error::HandshakeZeroSize));
}
