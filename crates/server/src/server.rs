//! Control-channel accept loop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::ServerError;
use crate::handler;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Control port to listen on (0 = OS-assigned).
    pub port: u16,
    /// Directory served for listings and file requests.
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            root: PathBuf::from("."),
        }
    }
}

/// The fileport control server.
///
/// Accepts control connections until cancelled and handles each on its
/// own task. Requests are independent; no state is shared between them.
pub struct ControlServer {
    config: ServerConfig,
    cancel: CancellationToken,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl ControlServer {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            cancel: CancellationToken::new(),
            local_addr: Mutex::new(None),
        })
    }

    /// Returns the bound address. Only available after [`run`](Self::run)
    /// binds the socket.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Returns the listening port (0 if not yet bound).
    pub async fn port(&self) -> u16 {
        self.local_addr.lock().await.map(|a| a.port()).unwrap_or(0)
    }

    /// Gracefully shuts down the accept loop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Binds the control port and serves until cancellation.
    pub async fn run(self: &Arc<Self>) -> Result<(), ServerError> {
        let addr: SocketAddr = ([0, 0, 0, 0], self.config.port).into();
        let listener = TcpListener::bind(addr).await?;

        let local_addr = listener.local_addr()?;
        *self.local_addr.lock().await = Some(local_addr);
        info!("server open for connections on {local_addr}");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("server shut down");
                    break Ok(());
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            info!(%peer, "control connection accepted");
                            let root = self.config.root.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handler::handle_connection(stream, peer, root).await {
                                    error!(%peer, "request failed: {e}");
                                }
                            });
                        }
                        Err(e) => {
                            error!("accept error: {e}");
                        }
                    }
                }
            }
        }
    }
}
