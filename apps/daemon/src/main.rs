//! fileport server daemon entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fileport_protocol::validate_port;
use fileport_server::{ControlServer, ServerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "fileportd",
    version,
    about = "Serve files and directory listings over the fileport protocol"
)]
struct Args {
    /// Control port to listen on [1024-65535]
    #[arg(value_parser = port_arg)]
    control_port: u16,

    /// Directory to serve
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

fn port_arg(value: &str) -> Result<u16, String> {
    validate_port(value).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.control_port,
        root = %args.root.display(),
        "starting fileport server"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let server = ControlServer::new(ServerConfig {
            port: args.control_port,
            root: args.root,
        });

        // Ctrl-C cancels the accept loop.
        let shutdown = std::sync::Arc::clone(&server);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.shutdown();
            }
        });

        server.run().await
    })?;

    tracing::info!("server shut down cleanly");
    Ok(())
}
