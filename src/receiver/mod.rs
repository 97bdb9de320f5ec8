//! The receiver's packet-intake loop: read fixed-size quanta, slot them
//! into the reassembly buffer, acknowledge cumulatively, and terminate
//! on the sender's end-of-stream packet.
//!
//! Grounded on the teacher's `association_internal.rs` single-task
//! receive loop (`read_loop`) and `queue/reassembly_queue.rs`'s
//! read-then-flatten shape, reduced to one task since there is no
//! concurrent receive-side writer to coordinate with.

mod reassembly;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::packet::{Packet, HEADER_SIZE};
use reassembly::ReassemblyBuffer;

/// Serves one receiver session over `stream`, returning the reassembled
/// message once the sender's terminator arrives.
///
/// `max_payload_size` is the M this receiver announced during the
/// handshake; every packet on the wire is exactly `M + 16` bytes.
///
/// Fails with [`Error::IncompleteMessage`] if the stream ends before
/// every fragment has arrived, and with [`Error::PeerClosed`] if the
/// stream closes mid-packet.
pub async fn serve<S>(mut stream: S, max_payload_size: u32) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let quantum = max_payload_size as usize + HEADER_SIZE;
    let mut buf = vec![0u8; quantum];
    let mut buffer = ReassemblyBuffer::new();

    loop {
        if !read_quantum(&mut stream, &mut buf).await? {
            log::debug!("receiver: stream ended without a terminator");
            break;
        }

        let payload = Bytes::copy_from_slice(&buf[HEADER_SIZE..]);
        let packet = Packet::unpack(&buf[..HEADER_SIZE], payload)?;

        if packet.ack_msg {
            log::debug!("receiver: terminator received at seq={}", packet.seq_num);
            break;
        }

        log::trace!("receiver: data packet seq={} received", packet.seq_num);
        buffer.insert(packet);

        let ack = buffer.cumulative_ack();
        if ack >= 0 {
            send_ack(&mut stream, ack as u32).await?;
            log::debug!("receiver: ack {ack} sent");
        }
    }

    buffer.into_message()
}

/// Reads exactly `buf.len()` bytes, looping across short reads.
///
/// Returns `Ok(false)` if the stream ends cleanly on a quantum boundary
/// (no bytes read yet), or `Err(Error::PeerClosed)` if it ends partway
/// through a quantum — a full read is never assumed from a single
/// `poll_read`.
async fn read_quantum<R>(reader: &mut R, buf: &mut [u8]) -> Result<bool>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(false)
            } else {
                Err(Error::PeerClosed)
            };
        }
        filled += n;
    }
    Ok(true)
}

async fn send_ack<S>(stream: &mut S, ack_number: u32) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let ack = Packet {
        seq_num: ack_number,
        ack_msg: false,
        timestamp: 0.0,
        payload: Bytes::new(),
    };
    stream.write_all(&ack.pack()).await?;
    Ok(())
}
