//! Sentinel-framed payload streaming.
//!
//! One generic primitive per direction moves a payload of unbounded
//! size in bounded chunks. File transfer and listing transfer differ
//! only in the source/sink they plug in (a file, a byte slice, stdout),
//! never in the chunk loop.
//!
//! # Known limitation
//!
//! End of stream is signaled by the literal [`SENTINEL`] token in band.
//! A payload that itself contains the token is truncated at its first
//! occurrence; the receiver cannot tell the difference. This is part of
//! the wire format and is deliberately not corrected here.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::DataChannelError;
use crate::{CHUNK_READ_TIMEOUT, CHUNK_SIZE, SENTINEL};

/// Streams `source` to `writer` in [`CHUNK_SIZE`] chunks, then emits
/// the sentinel and flushes.
///
/// The sentinel always goes out in a single write of its own, so it is
/// never split across writes. Returns the payload bytes sent, sentinel
/// excluded.
pub async fn send_framed<R, W>(source: &mut R, writer: &mut W) -> Result<u64, DataChannelError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut sent: u64 = 0;

    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        sent += n as u64;
    }

    writer.write_all(SENTINEL).await?;
    writer.flush().await?;

    tracing::debug!(bytes = sent, "framed payload sent");
    Ok(sent)
}

/// Streams a framed payload from `reader` into `sink` until the
/// sentinel is seen.
///
/// Bytes are forwarded to the sink as they arrive, holding back only
/// the last `SENTINEL.len() - 1` bytes so a sentinel straddling a read
/// boundary is still recognized. Reading stops at the first sentinel
/// occurrence; anything after it on the stream is ignored.
///
/// A clean EOF before the sentinel means the peer died mid-transfer and
/// is reported as [`DataChannelError::MissingEof`]; a sender that stalls
/// longer than [`CHUNK_READ_TIMEOUT`] between chunks is reported as
/// [`DataChannelError::Timeout`].
///
/// Returns the payload bytes written to the sink.
pub async fn receive_framed<R, W>(reader: &mut R, sink: &mut W) -> Result<u64, DataChannelError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    // Unflushed tail: never longer than CHUNK_SIZE + SENTINEL.len() - 1.
    let mut pending: Vec<u8> = Vec::with_capacity(CHUNK_SIZE + SENTINEL.len());
    let mut written: u64 = 0;

    loop {
        let n = match timeout(CHUNK_READ_TIMEOUT, reader.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(DataChannelError::Timeout),
        };
        if n == 0 {
            return Err(DataChannelError::MissingEof);
        }
        pending.extend_from_slice(&buf[..n]);

        if let Some(pos) = find_sentinel(&pending) {
            sink.write_all(&pending[..pos]).await?;
            written += pos as u64;
            sink.flush().await?;
            tracing::debug!(bytes = written, "framed payload received");
            return Ok(written);
        }

        // No sentinel yet: flush everything that cannot be a prefix of it.
        let keep = (SENTINEL.len() - 1).min(pending.len());
        let flush = pending.len() - keep;
        if flush > 0 {
            sink.write_all(&pending[..flush]).await?;
            sink.flush().await?;
            written += flush as u64;
            pending.drain(..flush);
        }
    }
}

fn find_sentinel(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(SENTINEL.len())
        .position(|window| window == SENTINEL)
}
