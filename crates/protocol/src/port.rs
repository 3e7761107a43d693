//! Port-range validation for the argument boundary.
//!
//! Both binaries validate port arguments here before any protocol code
//! runs, so the codec and the rendezvous only ever see in-range ports.

/// Lowest port a fileport endpoint may use (below this is privileged).
pub const MIN_PORT: u16 = 1024;

/// Highest valid TCP port.
pub const MAX_PORT: u16 = 65535;

/// Rejection produced by [`validate_port`].
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0:?} is not a valid integer")]
    NotANumber(String),

    #[error("{0} must be in [{MIN_PORT}, {MAX_PORT}]")]
    OutOfRange(u32),
}

/// Parses a port argument, accepting only the range [1024, 65535].
pub fn validate_port(value: &str) -> Result<u16, PortError> {
    let n: u32 = value
        .parse()
        .map_err(|_| PortError::NotANumber(value.to_string()))?;
    if n < MIN_PORT as u32 || n > MAX_PORT as u32 {
        return Err(PortError::OutOfRange(n));
    }
    Ok(n as u16)
}
