//! Client side of the fileport control/data rendezvous.
//!
//! [`TransferClient`] drives one complete exchange: control connect,
//! data-port listen, request send, status read, data accept, framed
//! receive, teardown. Each step completes before the next begins; one
//! request per client, no internal parallelism.
//!
//! The library never terminates the process. A server-reported error
//! comes back as [`ClientError::Remote`] and the exit-code decision
//! belongs to the caller.

mod session;

pub use session::{TransferClient, TransferOutcome};

use fileport_data_channel::DataChannelError;

/// Errors produced while running a client exchange.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The control connection could not be established. Fatal, no retry.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// The local data port could not be bound. Fatal, no retry.
    #[error("failed to bind data port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Channel(#[from] DataChannelError),

    /// The server replied with a status other than `OK`.
    #[error("{0}")]
    Remote(String),

    /// The control channel closed before a status reply arrived.
    #[error("control channel closed before status reply")]
    NoStatus,

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}
