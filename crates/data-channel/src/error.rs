//! Error types for the data channel.

/// Errors produced by data-channel establishment and framed streaming.
#[derive(Debug, thiserror::Error)]
pub enum DataChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data channel timed out")]
    Timeout,

    #[error("stream closed before end-of-stream marker")]
    MissingEof,
}
