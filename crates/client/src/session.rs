//! One client exchange, as an explicit step sequence.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

use fileport_data_channel::{accept_data_channel, receive_framed};
use fileport_protocol::{MAX_LINE, Mode, Request, STATUS_OK};

use crate::ClientError;

/// Timeout for the control-channel connect.
const CONTROL_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the status reply.
const STATUS_TIMEOUT: Duration = Duration::from_secs(30);

/// How one exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The payload was received in full.
    Complete { bytes: u64 },
    /// A file of the requested name already exists locally; nothing was
    /// read from the data channel and nothing was written.
    SkippedExisting,
}

/// Runs one transfer request against a fileport server.
pub struct TransferClient {
    request: Request,
    output_dir: PathBuf,
}

impl TransferClient {
    /// Creates a client that writes received files into the current
    /// working directory.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            output_dir: PathBuf::from("."),
        }
    }

    /// Overrides the directory received files are written into.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Drives the exchange from control connect to teardown.
    ///
    /// The steps run strictly in order; in particular the data listener
    /// is bound *before* the request is transmitted, so the server's
    /// connect-back always finds a listener. On every path the data
    /// stream is dropped before the control stream.
    pub async fn run(&self) -> Result<TransferOutcome, ClientError> {
        let req = &self.request;

        // 1. Connect the control channel.
        let mut control = self.connect_control().await?;
        info!(host = %req.host, port = req.control_port, "control channel connected");

        // 2. Listen on the data port. Must precede the request send.
        let listener = TcpListener::bind(("0.0.0.0", req.data_port))
            .await
            .map_err(|e| ClientError::Bind {
                port: req.data_port,
                source: e,
            })?;
        debug!(port = req.data_port, "data port listening");

        // 3. Transmit the request line.
        control.write_all(req.encode().as_bytes()).await?;

        // 4. Read the status reply. A non-OK reply ends the exchange
        //    with no data-channel activity at all.
        let status = read_status(&mut control).await?;
        if status != STATUS_OK {
            return Err(ClientError::Remote(status));
        }
        debug!("server accepted request");

        // 5. Accept the single inbound data connection.
        let mut data = accept_data_channel(listener).await?;

        // 6. Receive the payload.
        let outcome = match &req.mode {
            Mode::Get { filename } => self.receive_file(&mut data, filename).await?,
            Mode::List => {
                let mut stdout = tokio::io::stdout();
                let bytes = receive_framed(&mut data, &mut stdout).await?;
                TransferOutcome::Complete { bytes }
            }
        };

        // 7. Teardown: `data`, then `control`, dropped in that order.
        Ok(outcome)
    }

    async fn connect_control(&self) -> Result<TcpStream, ClientError> {
        let req = &self.request;
        let addr = (req.host.as_str(), req.control_port);
        match timeout(CONTROL_CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ClientError::Connect {
                host: req.host.clone(),
                port: req.control_port,
                source: e,
            }),
            Err(_) => Err(ClientError::Timeout("control connect")),
        }
    }

    /// Receives file bytes into `output_dir/filename`.
    ///
    /// Refuses to overwrite: if the destination already exists, nothing
    /// is read from the channel. The channel is single-use and closed
    /// right after, so the unread payload is discarded with it.
    async fn receive_file(
        &self,
        data: &mut TcpStream,
        filename: &str,
    ) -> Result<TransferOutcome, ClientError> {
        let dest = self.output_dir.join(filename);
        if tokio::fs::try_exists(&dest).await? {
            info!(file = filename, "destination exists, skipping transfer");
            return Ok(TransferOutcome::SkippedExisting);
        }

        let mut file = tokio::fs::File::create(&dest).await?;
        let bytes = receive_framed(data, &mut file).await?;
        info!(file = filename, bytes, "file received");
        Ok(TransferOutcome::Complete { bytes })
    }
}

/// Reads the one status message: a single bounded read, like the wire
/// format requires.
async fn read_status(control: &mut TcpStream) -> Result<String, ClientError> {
    let mut buf = vec![0u8; MAX_LINE];
    let n = match timeout(STATUS_TIMEOUT, control.read(&mut buf)).await {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(ClientError::Timeout("status reply")),
    };
    if n == 0 {
        return Err(ClientError::NoStatus);
    }
    Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string())
}
