//! Splits a message into equal-length, space-padded fragments.

use bytes::Bytes;

/// Splits `message` into `ceil(message.len() / max_payload_size)`
/// fragments of exactly `max_payload_size` bytes each, right-padding the
/// final fragment with ASCII space (0x20).
///
/// An empty message still produces exactly one all-space fragment, so
/// the receiver can terminate deterministically on the sender's
/// end-of-stream packet.
///
/// # Panics
///
/// Panics if `max_payload_size` is zero — callers must reject a zero
/// negotiated payload size during the handshake, before fragmenting.
pub fn fragment(message: &[u8], max_payload_size: usize) -> Vec<Bytes> {
    assert!(max_payload_size > 0, "max_payload_size must be positive");

    let num_fragments = if message.is_empty() {
        1
    } else {
        (message.len() + max_payload_size - 1) / max_payload_size
    };

    let mut fragments = Vec::with_capacity(num_fragments);
    for i in 0..num_fragments {
        let start = i * max_payload_size;
        let end = (start + max_payload_size).min(message.len());
        let chunk = &message[start..end];

        if chunk.len() == max_payload_size {
            fragments.push(Bytes::copy_from_slice(chunk));
        } else {
            let mut padded = vec![b' '; max_payload_size];
            padded[..chunk.len()].copy_from_slice(chunk);
            fragments.push(Bytes::from(padded));
        }
    }

    fragments
}
