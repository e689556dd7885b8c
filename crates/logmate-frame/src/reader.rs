use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::net::TcpStream;

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};
use crate::record::Record;
use crate::stream::StreamDecoder;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Pulls records from a blocking byte stream.
///
/// Chunks go through a [`StreamDecoder`]; records it completes ahead of
/// the caller are queued and handed out one per call.
pub struct RecordReader<T> {
    inner: T,
    decoder: StreamDecoder,
    pending: VecDeque<Record>,
}

impl<T: Read> RecordReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: StreamDecoder::with_config(config),
            pending: VecDeque::new(),
        }
    }

    /// Read the next record, blocking until one is complete.
    ///
    /// `Ok(None)` means the peer closed the stream on a frame boundary.
    /// EOF inside a frame is `Err(FrameError::ConnectionClosed)`.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Ok(Some(record));
            }

            // An error deferred behind already queued records shows up here.
            self.pending.extend(self.decoder.feed(&[])?);
            if !self.pending.is_empty() {
                continue;
            }

            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return match self.decoder.buffered() {
                    0 => Ok(None),
                    _ => Err(FrameError::ConnectionClosed),
                };
            }

            self.pending.extend(self.decoder.feed(&chunk[..read])?);
        }
    }

    /// Bytes read from the stream that do not yet form a record.
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}

impl RecordReader<TcpStream> {
    /// Reader over a TCP connection, with the configured read timeout applied.
    pub fn with_config_tcp(inner: TcpStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
