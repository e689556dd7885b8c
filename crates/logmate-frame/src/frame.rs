//! Frame boundary detection.
//!
//! ```text
//! ┌───────────────────┬─────────────────────────────────────────┐
//! │ Body length (4B)  │ Body: part count (2B BE) + parts        │
//! │ u32 BE, non-zero  │ (Body length bytes)                     │
//! └───────────────────┴─────────────────────────────────────────┘
//! ```

use crate::error::{FrameError, Result};
use crate::fields::{key, MessageKind};
use crate::part::{be_uint, PartList};

/// Size of the body length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Body lengths at or above this are treated as stream corruption.
pub const MAX_FRAME_SIZE: usize = 1_000_000_000;

/// A complete frame found at the front of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Length of the body, excluding the length prefix.
    pub body_len: usize,
    pub kind: MessageKind,
    /// Sequence number, 0 when the frame has none.
    pub sequence: u64,
}

impl FrameHeader {
    /// Bytes the frame occupies on the wire, length prefix included.
    pub fn wire_size(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.body_len
    }
}

/// Check whether `src` starts with a complete frame and classify it.
///
/// Returns `Ok(None)` if more bytes are needed. Nothing is consumed either
/// way; the caller advances past [`FrameHeader::wire_size`] bytes once it is
/// done with the frame. `max_frame_size` can only tighten
/// [`MAX_FRAME_SIZE`].
pub fn detect_frame(src: &[u8], max_frame_size: usize) -> Result<Option<FrameHeader>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None); // Need more data
    }

    let size = be_uint(&src[..LENGTH_PREFIX_SIZE]) as u32;
    let body_len = size as usize;
    if body_len == 0 || body_len >= max_frame_size.min(MAX_FRAME_SIZE) {
        return Err(FrameError::InvalidFrameSize { size });
    }

    let total = LENGTH_PREFIX_SIZE + body_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let parts = PartList::new(&src[LENGTH_PREFIX_SIZE..total])?;

    let code = parts
        .int(key::MESSAGE_TYPE)?
        .ok_or(FrameError::MissingMessageType)?;
    let kind = MessageKind::from_code(code).ok_or(FrameError::UnknownMessageType(code))?;

    let sequence = match parts.int(key::SEQUENCE_NUMBER)? {
        Some(value) => u64::try_from(value).map_err(|_| FrameError::InvalidSequence(value))?,
        None => 0,
    };

    Ok(Some(FrameHeader {
        body_len,
        kind,
        sequence,
    }))
}
