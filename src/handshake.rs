//! Negotiates the maximum payload size M between receiver and sender.
//!
//! The receiver announces M as decimal ASCII, right-padded with spaces
//! to exactly [`PREAMBLE_SIZE`] bytes, in a single write. The sender
//! reads up to [`PREAMBLE_SIZE`] bytes, trims whitespace, and parses the
//! remainder as a decimal integer. The fixed width lets both sides
//! agree on how many bytes to read without a separate length prefix.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{Error, Result};

/// Width in bytes of the handshake preamble.
pub const PREAMBLE_SIZE: usize = 1024;

/// Receiver side: announce `max_payload_size` to the peer.
pub async fn send_max_payload_size<W>(writer: &mut W, max_payload_size: u32) -> Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let digits = max_payload_size.to_string();
    let mut preamble = vec![b' '; PREAMBLE_SIZE];
    preamble[..digits.len()].copy_from_slice(digits.as_bytes());
    writer.write_all(&preamble).await?;
    Ok(())
}

/// Sender side: read the peer's negotiated maximum payload size.
///
/// Fails with [`Error::HandshakeParseError`] if the preamble does not
/// contain a decimal integer, or [`Error::HandshakeZeroSize`] if the
/// negotiated size is zero — the caller must abort before entering
/// `SenderEngine` in that case.
pub async fn recv_max_payload_size<R>(reader: &mut R) -> Result<u32>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut preamble = vec![0u8; PREAMBLE_SIZE];
    reader.read_exact(&mut preamble).await?;

    let text = String::from_utf8_lossy(&preamble);
    let trimmed = text.trim();

    let max_payload_size: u32 = trimmed
        .parse()
        .map_err(|_| Error::HandshakeParseError(trimmed.to_owned()))?;

    if max_payload_size == 0 {
        return Err(Error::HandshakeZeroSize);
    }

    Ok(max_payload_size)
}
