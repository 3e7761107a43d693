//! Wire protocol types for the fileport control channel.
//!
//! The control channel carries exactly two messages per request: one
//! command line from the client and one status line from the server.
//! Both are plain UTF-8 text with no terminator; each side reads them
//! with a single bounded read.
//!
//! # Command line format
//!
//! ```text
//! <host> <controlPort> -g <filename> <dataPort>   fetch one file
//! <host> <controlPort> -l <dataPort>              list the serve root
//! ```
//!
//! The status line is either [`STATUS_OK`] or a human-readable error
//! description.

mod command;
mod port;

pub use command::{CommandError, Mode, Request};
pub use port::{PortError, validate_port};

/// Status reply sent when a request is accepted.
pub const STATUS_OK: &str = "OK";

/// Maximum size of a control-channel message (command or status line).
///
/// Both sides read control messages with a single read of this size, so
/// longer messages are truncated on the wire.
pub const MAX_LINE: usize = 1024;
