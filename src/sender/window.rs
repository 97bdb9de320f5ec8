//! The sender's sliding window: a FIFO of in-flight, unacknowledged
//! packets bounded by the configured window size, mirroring the shape
//! of the teacher's `PendingBaseQueue = VecDeque<ChunkPayloadData>`
//! (`src/queue/pending_queue.rs`) without that crate's unordered/ordered
//! split — this protocol has exactly one ordering discipline.

use std::collections::VecDeque;

use crate::packet::Packet;

/// FIFO of packets currently in flight, ordered by ascending sequence
/// number. Invariant: sequence numbers in the window are strictly
/// increasing and contiguous.
#[derive(Debug, Default)]
pub(crate) struct SendWindow {
    packets: VecDeque<Packet>,
    capacity: usize,
}

impl SendWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        SendWindow {
            packets: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.packets.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.packets.len() >= self.capacity
    }

    pub(crate) fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.packets.len())
    }

    /// Drops every packet whose sequence number is `<= cumulative_ack`.
    pub(crate) fn retire_acked(&mut self, cumulative_ack: i64) {
        while let Some(front) = self.packets.front() {
            if (front.seq_num as i64) <= cumulative_ack {
                self.packets.pop_front();
            } else {
                break;
            }
        }
    }

    pub(crate) fn push(&mut self, packet: Packet) {
        self.packets.push_back(packet);
    }

    pub(crate) fn front(&self) -> Option<&Packet> {
        self.packets.front()
    }

    pub(crate) fn back(&self) -> Option<&Packet> {
        self.packets.back()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Packet> {
        self.packets.iter_mut()
    }
}
