use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the RODT sender and receiver engines.
#[derive(Debug, Error)]
pub enum Error {
    #[error("packet header is malformed: {0}")]
    BadFrame(String),

    #[error("handshake preamble did not parse as a decimal integer: {0:?}")]
    HandshakeParseError(String),

    #[error("handshake negotiated a maximum payload size of zero")]
    HandshakeZeroSize,

    #[error("local I/O failure during transmission: {0}")]
    TransmissionAborted(#[from] std::io::Error),

    #[error("peer closed the stream before the session completed")]
    PeerClosed,

    #[error("stream ended with missing fragments and no terminator")]
    IncompleteMessage,
}
