//! Per-connection request handling.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{info, warn};

use fileport_data_channel::{connect_data_channel, send_framed};
use fileport_protocol::{MAX_LINE, Mode, Request, STATUS_OK};

use crate::ServerError;

/// Timeout for the single command read on a fresh control connection.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Handles one control connection: read command, validate, reply,
/// push payload.
///
/// Decode failures and missing files are reported to the client as
/// status strings, not surfaced as errors here; in both cases no
/// data-channel activity happens for the request.
pub async fn handle_connection(
    mut control: TcpStream,
    peer: SocketAddr,
    root: PathBuf,
) -> Result<(), ServerError> {
    let line = read_command(&mut control).await?;

    let request = match Request::decode(&line) {
        Ok(request) => request,
        Err(e) => {
            warn!(%peer, error = %e, "malformed command");
            control.write_all(b"Invalid command").await?;
            return Ok(());
        }
    };

    match &request.mode {
        Mode::List => {
            info!(%peer, port = request.data_port, "directory listing requested");
            let listing = directory_listing(&root).await?;

            control.write_all(STATUS_OK.as_bytes()).await?;
            let mut data = open_data_channel(peer, request.data_port).await?;
            let sent = send_framed(&mut listing.as_bytes(), &mut data).await?;
            info!(%peer, bytes = sent, "listing sent");
        }
        Mode::Get { filename } => {
            info!(%peer, file = %filename, port = request.data_port, "file requested");
            let Some(mut file) = open_requested(&root, filename).await else {
                let reply = format!("File \"{filename}\" not found");
                warn!(%peer, file = %filename, "requested file not available");
                control.write_all(reply.as_bytes()).await?;
                return Ok(());
            };

            control.write_all(STATUS_OK.as_bytes()).await?;
            let mut data = open_data_channel(peer, request.data_port).await?;
            let sent = send_framed(&mut file, &mut data).await?;
            info!(%peer, file = %filename, bytes = sent, "file sent");
        }
    }

    Ok(())
}

/// One bounded read for the command line, like the wire format requires.
async fn read_command(control: &mut TcpStream) -> Result<String, ServerError> {
    let mut buf = vec![0u8; MAX_LINE];
    let n = match timeout(COMMAND_TIMEOUT, control.read(&mut buf)).await {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(ServerError::CommandTimeout),
    };
    if n == 0 {
        return Err(ServerError::EmptyCommand);
    }
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

/// Connects back to the client's data port. The status reply must
/// already be on the wire when this is called.
async fn open_data_channel(
    peer: SocketAddr,
    data_port: u16,
) -> Result<TcpStream, ServerError> {
    let addr = SocketAddr::from((peer.ip(), data_port));
    Ok(connect_data_channel(addr).await?)
}

/// Opens `name` under the serve root if it is a plain filename that
/// refers to a regular file there.
///
/// Names carrying path separators or parent components cannot address
/// anything inside the root and resolve to "not found".
async fn open_requested(root: &Path, name: &str) -> Option<tokio::fs::File> {
    if !is_safe_name(name) {
        return None;
    }
    let path = root.join(name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => tokio::fs::File::open(&path).await.ok(),
        _ => None,
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Names of the regular files directly inside `root`, sorted,
/// newline-joined. Subdirectories are not listed and not descended
/// into.
pub(crate) async fn directory_listing(root: &Path) -> Result<String, ServerError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names.join("\n"))
}
