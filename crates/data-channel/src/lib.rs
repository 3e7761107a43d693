//! TCP data channel for payload transfers.
//!
//! A data channel is opened fresh for every request: the client binds a
//! listener on its data port before sending the command, the server
//! connects back after replying `OK`. The channel carries exactly one
//! framed payload (file bytes or a directory listing) and is then
//! closed. It is never reused.
//!
//! # Wire format
//!
//! ```text
//! [payload bytes, streamed in chunks of at most CHUNK_SIZE]
//! [7 bytes: the literal sentinel "__EOF__"]
//! ```
//!
//! There are no length prefixes; the sentinel is the only framing. See
//! [`framing`] for the consequences.

pub mod channel;
pub mod error;
pub mod framing;

pub use channel::{accept_data_channel, connect_data_channel};
pub use error::DataChannelError;
pub use framing::{receive_framed, send_framed};

use std::time::Duration;

/// Fixed chunk size for payload reads and writes (1 KiB).
pub const CHUNK_SIZE: usize = 1024;

/// In-band end-of-stream marker.
///
/// The sentinel must never occur inside legitimate payload bytes; the
/// protocol does not escape it.
pub const SENTINEL: &[u8] = b"__EOF__";

/// Timeout for the server's connect-back attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the client's wait for the inbound data connection.
pub const ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for each chunk read while receiving a framed payload.
pub const CHUNK_READ_TIMEOUT: Duration = Duration::from_secs(30);
