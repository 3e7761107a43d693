//! Command-line codec for the control channel.

/// What the client is asking the server to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Fetch a single file from the server's serve root.
    Get { filename: String },
    /// Fetch the listing of the server's serve root.
    List,
}

/// One fully-specified transfer request.
///
/// `host` and `control_port` identify the server; `data_port` is the
/// port the client listens on for the connect-back. Immutable for the
/// lifetime of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub host: String,
    pub control_port: u16,
    pub data_port: u16,
    pub mode: Mode,
}

/// Errors produced when decoding a command line.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command must specify either -g <filename> or -l")]
    MissingMode,

    #[error("invalid port number: {0:?}")]
    InvalidPort(String),

    #[error("wrong number of fields: expected {expected}, got {got}")]
    TokenCount { expected: usize, got: usize },
}

impl Request {
    /// Serializes the request into its single-line wire form.
    ///
    /// The line carries no trailing newline; the peer reads it with one
    /// bounded read.
    pub fn encode(&self) -> String {
        match &self.mode {
            Mode::Get { filename } => format!(
                "{} {} -g {} {}",
                self.host, self.control_port, filename, self.data_port
            ),
            Mode::List => format!("{} {} -l {}", self.host, self.control_port, self.data_port),
        }
    }

    /// Parses a command line back into a [`Request`].
    ///
    /// Splits on any run of ASCII whitespace, so incidental spacing does
    /// not affect the result. The flag must appear in the third field.
    pub fn decode(line: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let flag = tokens.get(2).copied().ok_or(CommandError::MissingMode)?;
        let (mode, expected) = match flag {
            "-g" => {
                let filename = tokens.get(3).copied().ok_or(CommandError::TokenCount {
                    expected: 5,
                    got: tokens.len(),
                })?;
                (
                    Mode::Get {
                        filename: filename.to_string(),
                    },
                    5,
                )
            }
            "-l" => (Mode::List, 4),
            _ => return Err(CommandError::MissingMode),
        };
        if tokens.len() != expected {
            return Err(CommandError::TokenCount {
                expected,
                got: tokens.len(),
            });
        }

        Ok(Request {
            host: tokens[0].to_string(),
            control_port: parse_port(tokens[1])?,
            data_port: parse_port(tokens[expected - 1])?,
            mode,
        })
    }
}

fn parse_port(token: &str) -> Result<u16, CommandError> {
    token
        .parse::<u16>()
        .map_err(|_| CommandError::InvalidPort(token.to_string()))
}
