//! Reliable ordered data transfer over a byte-stream transport.
//!
//! This crate layers a sliding-window, Go-Back-N style delivery
//! protocol on top of anything that implements [`tokio::io::AsyncRead`]
//! and [`tokio::io::AsyncWrite`] — a TCP stream, a Unix socket, an
//! in-memory duplex pipe. The underlying transport is assumed to
//! deliver bytes reliably and in order; this crate's job is framing,
//! windowed retransmission, and reassembly on top of it, the same way
//! an SCTP association layers streams and reliability on top of plain
//! UDP datagrams.
//!
//! A session starts with a [`handshake`] to agree on a maximum payload
//! size, then the sender [`fragment`]s its message and drives
//! [`sender::run`] while the receiver drives [`receiver::serve`].

#![warn(rust_2018_idioms)]

mod error;
mod fragment;
mod handshake;
mod packet;
mod receiver;
mod sender;
mod session;

pub use crate::error::{Error, Result};
pub use crate::fragment::fragment;
pub use crate::handshake::{recv_max_payload_size, send_max_payload_size};
pub use crate::packet::{Packet, HEADER_SIZE};
pub use crate::session::{ReceiverConfig, SenderConfig};

use tokio::io::{AsyncRead, AsyncWrite};

/// Runs a complete sender session: fragments `message`, then drives the
/// sliding window until every fragment is acknowledged and the
/// terminator has been sent.
pub async fn send<S>(stream: S, message: &[u8], config: SenderConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let fragments = fragment(message, config.max_payload_size as usize);
    sender::run(stream, fragments, config.window_size, config.timeout).await
}

/// Runs a complete receiver session, returning the reassembled message
/// once the sender's terminator has arrived.
pub async fn recv<S>(stream: S, config: ReceiverConfig) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    receiver::serve(stream, config.max_payload_size).await
}
