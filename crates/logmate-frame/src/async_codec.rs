//! `tokio_util` codec for use with `FramedRead`, `FramedWrite` and `Framed`.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_record, encode_record, FrameConfig};
use crate::error::FrameError;
use crate::frame::LENGTH_PREFIX_SIZE;
use crate::record::Record;

/// Record codec for async byte streams.
#[derive(Debug, Clone, Default)]
pub struct LogCodec {
    config: FrameConfig,
}

impl LogCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for LogCodec {
    type Item = Record;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_record(src, self.config.max_frame_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(record) => Ok(Some(record)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl<'a> Encoder<&'a Record> for LogCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &'a Record, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let written = encode_record(item, dst)?;
        let body_len = written - LENGTH_PREFIX_SIZE;
        if body_len >= self.config.max_frame_size {
            dst.truncate(dst.len() - written);
            return Err(FrameError::FrameTooLarge {
                size: body_len,
                max: self.config.max_frame_size.saturating_sub(1),
            });
        }
        Ok(())
    }
}

impl Encoder<Record> for LogCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Record, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Record>::encode(self, &item, dst)
    }
}
