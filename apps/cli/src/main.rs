//! fileport client entry point.

use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use fileport_client::{ClientError, TransferClient, TransferOutcome};
use fileport_protocol::{Mode, Request, validate_port};

#[derive(Debug, Parser)]
#[command(
    name = "fileport",
    version,
    about = "Fetch a file or a directory listing from a fileport server",
    group(ArgGroup::new("mode").required(true).args(["get", "list"]))
)]
struct Args {
    /// Server host name or address
    server_host: String,

    /// Server control port [1024-65535]
    #[arg(value_parser = port_arg)]
    server_control_port: u16,

    /// Local port to listen on for the data connection [1024-65535]
    #[arg(value_parser = port_arg)]
    data_port: u16,

    /// Fetch FILENAME from the server
    #[arg(short = 'g', value_name = "FILENAME")]
    get: Option<String>,

    /// Fetch the listing of the server's serve root
    #[arg(short = 'l')]
    list: bool,
}

fn port_arg(value: &str) -> Result<u16, String> {
    validate_port(value).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mode = match (&args.get, args.list) {
        (Some(filename), _) => Mode::Get {
            filename: filename.clone(),
        },
        (None, _) => Mode::List,
    };
    let request = Request {
        host: args.server_host.clone(),
        control_port: args.server_control_port,
        data_port: args.data_port,
        mode,
    };

    match &args.get {
        Some(filename) => println!(
            "Requesting \"{filename}\" from {}:{}...",
            args.server_host, args.server_control_port
        ),
        None => println!(
            "Requesting directory listing from {}:{}...",
            args.server_host, args.server_control_port
        ),
    }

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(TransferClient::new(request).run());

    match outcome {
        Ok(TransferOutcome::Complete { .. }) => {
            if let Some(filename) = &args.get {
                println!("File \"{filename}\" transfer complete");
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(TransferOutcome::SkippedExisting) => {
            // Unreachable in list mode; the conflict check only runs for -g.
            let filename = args.get.as_deref().unwrap_or_default();
            println!(
                "File \"{filename}\" not transferred; already exists in {}",
                std::env::current_dir()?.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ClientError::Remote(message)) => {
            println!(
                "{}:{} says: {message}",
                args.server_host, args.server_control_port
            );
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e.into()),
    }
}
