//! Incremental decoding of a connection's byte stream.
//!
//! Bytes arrive in arbitrary chunks from the transport. [`StreamDecoder`]
//! keeps whatever does not yet form a complete frame and returns every
//! record completed by each chunk, in arrival order.
//!
//! ```
//! use logmate_frame::{encode_record, Record, StreamDecoder};
//! use bytes::BytesMut;
//!
//! let mut wire = BytesMut::new();
//! encode_record(&Record::Disconnect { sequence: 3 }, &mut wire).unwrap();
//!
//! let mut decoder = StreamDecoder::new();
//! assert!(decoder.feed(&wire[..5]).unwrap().is_empty());
//! let records = decoder.feed(&wire[5..]).unwrap();
//! assert_eq!(records, vec![Record::Disconnect { sequence: 3 }]);
//! ```

use bytes::BytesMut;
use tracing::debug;

use crate::codec::{decode_record, FrameConfig};
use crate::error::Result;
use crate::record::{ClientInfo, Record};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Connection lifecycle signal derived from a decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The producer identified itself.
    Connected(ClientInfo),
    /// The producer announced it is closing the connection.
    Disconnected,
}

impl LifecycleEvent {
    /// The event a record signals, if any.
    pub fn from_record(record: &Record) -> Option<Self> {
        match record {
            Record::ClientInfo { info, .. } => Some(Self::Connected(info.clone())),
            Record::Disconnect { .. } => Some(Self::Disconnected),
            _ => None,
        }
    }
}

/// Per-connection streaming decoder.
///
/// One instance per connection, fed serially. A decode error is fatal to
/// the stream: the offending bytes stay buffered, so every later call
/// reports the same error until the decoder is dropped.
#[derive(Debug)]
pub struct StreamDecoder {
    buf: BytesMut,
    config: FrameConfig,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append `bytes` and decode every complete record now available.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Record>> {
        self.feed_with(bytes, |_| {})
    }

    /// Like [`StreamDecoder::feed`], calling `on_event` for each connect or
    /// disconnect record as it is decoded.
    ///
    /// If an error follows records decoded in the same call, the records
    /// are returned and the error surfaces on the next call.
    pub fn feed_with<F>(&mut self, bytes: &[u8], mut on_event: F) -> Result<Vec<Record>>
    where
        F: FnMut(LifecycleEvent),
    {
        self.buf.extend_from_slice(bytes);

        let mut records = Vec::new();
        loop {
            match decode_record(&mut self.buf, self.config.max_frame_size) {
                Ok(Some(record)) => {
                    if let Some(event) = LifecycleEvent::from_record(&record) {
                        debug!(sequence = record.sequence(), ?event, "lifecycle event");
                        on_event(event);
                    }
                    records.push(record);
                }
                Ok(None) => return Ok(records),
                Err(err) if records.is_empty() => return Err(err),
                Err(err) => {
                    debug!(error = %err, decoded = records.len(), "deferring stream error");
                    return Ok(records);
                }
            }
        }
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
