//! Serving side of the fileport protocol.
//!
//! Accepts control connections, decodes the one-line command, and
//! either reports an error on the control channel or replies `OK` and
//! pushes the payload over a fresh data channel it opens toward the
//! client.
//!
//! The status reply always goes out before the connect-back attempt;
//! the client reads it before accepting. That ordering is what keeps
//! the two-socket handshake race-free and must not be reordered.

mod handler;
mod server;

pub use server::{ControlServer, ServerConfig};

use fileport_data_channel::DataChannelError;

/// Errors produced by the serving side.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Channel(#[from] DataChannelError),

    #[error("timed out reading command")]
    CommandTimeout,

    #[error("control connection closed before a command arrived")]
    EmptyCommand,
}
