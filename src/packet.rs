use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Size in bytes of a packet header: a 4-byte sequence/ack number, a
/// 1-byte flag, 3 bytes of alignment padding, and an 8-byte timestamp.
///
/// This mirrors the natural layout of a C-style `{ u32; bool; f64 }`
/// struct and is part of the wire contract — any alternative packing
/// breaks interoperability with a peer built to this layout.
pub const HEADER_SIZE: usize = 16;

/// One unit of wire traffic: a data fragment, a receiver ack, or the
/// sender's end-of-stream terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// Sequence number for data packets, acknowledgement number for acks.
    pub seq_num: u32,
    /// End-of-stream flag. Set only on the sender's terminator.
    pub ack_msg: bool,
    /// Wall-clock send time in seconds, used locally by the sender to
    /// gate retransmission; meaningless to the receiver.
    pub timestamp: f64,
    /// Opaque payload. Exactly the negotiated maximum payload size for
    /// data packets and the terminator; empty for receiver-emitted acks.
    pub payload: Bytes,
}

impl Packet {
    /// Writes the 16-byte header followed by the payload.
    pub fn pack(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        buf.put_u32_le(self.seq_num);
        buf.put_u8(self.ack_msg as u8);
        buf.put_bytes(0, 3); // padding, undefined but written as zero
        buf.put_f64_le(self.timestamp);
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Reverses [`Packet::pack`]. `header` must be exactly [`HEADER_SIZE`]
    /// bytes; `payload` is taken as-is, uninterpreted.
    pub fn unpack(header: &[u8], payload: Bytes) -> Result<Self> {
        if header.len() < HEADER_SIZE {
            return Err(Error::BadFrame(format!(
                "header is {} bytes, need at least {HEADER_SIZE}",
                header.len()
            )));
        }

        let mut reader = header;
        let seq_num = reader.get_u32_le();
        let ack_msg = reader.get_u8() != 0;
        reader.advance(3); // skip padding
        let timestamp = reader.get_f64_le();

        if timestamp.is_nan() {
            return Err(Error::BadFrame("timestamp is NaN".to_owned()));
        }

        Ok(Packet {
            seq_num,
            ack_msg,
            timestamp,
            payload,
        })
    }
}
