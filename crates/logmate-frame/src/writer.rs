use std::io::{ErrorKind, Write};
use std::net::TcpStream;

use bytes::BytesMut;

use crate::codec::{encode_record, FrameConfig};
use crate::error::{FrameError, Result};
use crate::frame::LENGTH_PREFIX_SIZE;
use crate::record::Record;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete records to any `Write` stream.
pub struct RecordWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> RecordWriter<T> {
    /// Create a new record writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new record writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and write one record, then flush (blocking).
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.buf.clear();
        self.encode_into_buf(record)?;
        self.write_buf()?;
        self.flush()
    }

    /// Encode several records and write them with a single flush.
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.buf.clear();
        for record in records {
            self.encode_into_buf(record)?;
        }
        self.write_buf()?;
        self.flush()
    }

    fn encode_into_buf(&mut self, record: &Record) -> Result<()> {
        let written = encode_record(record, &mut self.buf)?;
        let body_len = written - LENGTH_PREFIX_SIZE;
        if body_len >= self.config.max_frame_size {
            self.buf.truncate(self.buf.len() - written);
            return Err(FrameError::FrameTooLarge {
                size: body_len,
                max: self.config.max_frame_size.saturating_sub(1),
            });
        }
        Ok(())
    }

    fn write_buf(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum frame size for subsequent encoding.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.config.max_frame_size = max_frame_size;
    }

    /// Current record writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl RecordWriter<TcpStream> {
    /// Create a record writer for a TCP stream and apply write timeout from config.
    pub fn with_config_tcp(inner: TcpStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
