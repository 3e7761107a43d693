//! Data-channel establishment.
//!
//! The passive side (the client) binds its data port before the request
//! ever goes out and later accepts exactly one connection. The active
//! side (the server) connects back once it has replied `OK` on the
//! control channel. Both waits are bounded.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use crate::error::DataChannelError;
use crate::{ACCEPT_TIMEOUT, CONNECT_TIMEOUT};

/// Actively opens the data channel to `addr` (server side).
pub async fn connect_data_channel(addr: SocketAddr) -> Result<TcpStream, DataChannelError> {
    match timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            debug!(%addr, "data channel connected");
            Ok(stream)
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(DataChannelError::Timeout),
    }
}

/// Waits for the single inbound data connection (client side).
///
/// Consumes the listener: the channel is single-use, so the port stops
/// accepting as soon as the one connection is in.
pub async fn accept_data_channel(listener: TcpListener) -> Result<TcpStream, DataChannelError> {
    match timeout(ACCEPT_TIMEOUT, listener.accept()).await {
        Ok(Ok((stream, peer))) => {
            debug!(%peer, "data channel accepted");
            Ok(stream)
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(DataChannelError::Timeout),
    }
}
