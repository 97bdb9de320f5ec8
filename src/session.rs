//! Per-session configuration, explicit rather than global.
//!
//! The original prototype this engine is modeled on kept the negotiated
//! payload size, window size, and timeout as module-level globals
//! (`SLIDING_WINDOW_SIZE`, `TIMEOUT`, `MAX_PAYLOAD_SIZE`). Here they
//! become explicit fields threaded through the engine instead,
//! mirroring the teacher's own `Config` struct passed into
//! `Association::client`/`server`.

use std::time::Duration;

/// Sender-side session parameters.
#[derive(Debug, Clone, Copy)]
pub struct SenderConfig {
    /// Negotiated maximum payload size M, in bytes.
    pub max_payload_size: u32,
    /// Sliding window size W, in packets. Must be at least 1.
    pub window_size: usize,
    /// Retransmission timeout T. Supports sub-second precision.
    pub timeout: Duration,
}

/// Receiver-side session parameters.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverConfig {
    /// Maximum payload size M this receiver is willing to accept per
    /// packet; announced to the sender during the handshake.
    pub max_payload_size: u32,
}
