//! Frame codec
//!
//! Sentinel-terminated framing for stream transports.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────────────────────────────┬──────┐
//! │          Payload (no 0x00)          │ 0x00 │
//! └─────────────────────────────────────┴──────┘
//! ```
//!
//! There is no length prefix. The sentinel is the only boundary, so a
//! payload must never contain it.

use std::io::{BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LinkError, Result};

/// Reserved byte marking the end of a frame
pub const SENTINEL: u8 = 0x00;

/// Default maximum payload size accepted by `decode_frame` (1 MB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a payload as one frame
///
/// Fails with `UnsafePayload` if the payload already contains the sentinel.
pub fn encode_frame(payload: &[u8]) -> Result<Bytes> {
    if let Some(position) = payload.iter().position(|&b| b == SENTINEL) {
        return Err(LinkError::UnsafePayload { position });
    }

    let mut frame = BytesMut::with_capacity(payload.len() + 1);
    frame.put_slice(payload);
    frame.put_u8(SENTINEL);

    Ok(frame.freeze())
}

// =============================================================================
// Decoding
// =============================================================================

/// Read one frame from a buffered stream
///
/// Blocks until the sentinel arrives. Returns the payload without the
/// sentinel. Bytes after the sentinel stay in the reader's buffer for the
/// next call.
pub fn decode_frame<R: BufRead>(reader: &mut R) -> Result<Bytes> {
    decode_frame_with_limit(reader, MAX_FRAME_SIZE)
}

/// Read one frame, rejecting payloads longer than `limit` bytes
pub fn decode_frame_with_limit<R: BufRead>(reader: &mut R, limit: usize) -> Result<Bytes> {
    let mut buffer = Vec::new();

    // Payload plus sentinel fits in limit + 1 bytes
    let max_read = (limit as u64).saturating_add(1);
    reader.by_ref().take(max_read).read_until(SENTINEL, &mut buffer)?;

    match buffer.last() {
        Some(&SENTINEL) => {
            buffer.pop();
            Ok(Bytes::from(buffer))
        }
        _ if buffer.len() as u64 >= max_read => Err(LinkError::FrameTooLarge { limit }),
        _ => Err(LinkError::IncompleteFrame {
            received: buffer.len(),
        }),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Encode a payload and write it as one frame
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let frame = encode_frame(payload)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame of at most `limit` payload bytes
pub fn read_frame<R: BufRead>(reader: &mut R, limit: usize) -> Result<Bytes> {
    decode_frame_with_limit(reader, limit)
}
