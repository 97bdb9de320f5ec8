//! The receiver's in-order reassembly buffer: a sparse, monotonically
//! growing sequence of packet slots plus the cumulative-ack scan.
//!
//! Grounded in shape (not implementation) on the teacher's
//! `queue/payload_queue.rs` (sparse out-of-order tracking by sequence
//! number) and `queue/reassembly_queue.rs` (flattening completed data
//! into one contiguous message) — generalized from SCTP's TSN/hash-map
//! tracking down to a plain growable array of `Option<Packet>`.

use crate::error::{Error, Result};
use crate::packet::Packet;

/// Sparse, append-only sequence of received data packets.
#[derive(Debug, Default)]
pub(crate) struct ReassemblyBuffer {
    slots: Vec<Option<Packet>>,
}

impl ReassemblyBuffer {
    pub(crate) fn new() -> Self {
        ReassemblyBuffer { slots: Vec::new() }
    }

    /// Slots `packet` by its sequence number: appends if it extends the
    /// buffer, fills a gap if absent, and silently ignores it if the
    /// slot is already filled (duplicate).
    pub(crate) fn insert(&mut self, packet: Packet) {
        let seq = packet.seq_num as usize;
        let len = self.slots.len();

        if seq == len {
            self.slots.push(Some(packet));
        } else if seq > len {
            self.slots.resize_with(seq, || None);
            self.slots.push(Some(packet));
        } else if self.slots[seq].is_none() {
            self.slots[seq] = Some(packet);
        }
        // else: slot already filled, duplicate — ignore.
    }

    /// Largest `s` such that slots `0..=s` are all filled, or `-1` if
    /// slot 0 is absent.
    pub(crate) fn cumulative_ack(&self) -> i64 {
        let mut ack = -1i64;
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                ack = i as i64;
            } else {
                break;
            }
        }
        ack
    }

    /// Concatenates every slot's payload in order. Fails with
    /// [`Error::IncompleteMessage`] if any slot is still absent.
    pub(crate) fn into_message(self) -> Result<Vec<u8>> {
        let mut message = Vec::new();
        for slot in self.slots {
            match slot {
                Some(packet) => message.extend_from_slice(&packet.payload),
                None => return Err(Error::IncompleteMessage),
            }
        }
        Ok(message)
    }
}
