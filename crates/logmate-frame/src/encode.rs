use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::fields::{is_custom, key, ValueType};
use crate::frame::{LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};
use crate::part::PART_COUNT_SIZE;
use crate::record::{ClientInfo, LogMessage, Payload, Record};

/// Wire width of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W16,
    W32,
    W64,
}

impl IntWidth {
    /// The narrowest width that holds `value` without loss.
    pub fn for_value(value: i64) -> Self {
        if i16::try_from(value).is_ok() {
            Self::W16
        } else if i32::try_from(value).is_ok() {
            Self::W32
        } else {
            Self::W64
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Self::W16 => ValueType::Int16,
            Self::W32 => ValueType::Int32,
            Self::W64 => ValueType::Int64,
        }
    }
}

/// Appends the parts of one frame to a buffer.
///
/// The length prefix and part count are written as placeholders and
/// backpatched by [`PartWriter::finish`].
pub struct PartWriter<'a> {
    dst: &'a mut BytesMut,
    start: usize,
    parts: usize,
}

impl<'a> PartWriter<'a> {
    /// Start a frame at the end of `dst`.
    pub fn begin(dst: &'a mut BytesMut) -> Self {
        let start = dst.len();
        dst.put_u32(0);
        dst.put_u16(1);
        Self {
            dst,
            start,
            parts: 0,
        }
    }

    /// Write an integer field at the narrowest lossless width.
    pub fn put_int(&mut self, key: u8, value: i64) {
        let width = IntWidth::for_value(value);
        self.put_header(key, width.value_type());
        match width {
            IntWidth::W16 => self.dst.put_i16(value as i16),
            IntWidth::W32 => self.dst.put_i32(value as i32),
            IntWidth::W64 => self.dst.put_i64(value),
        }
    }

    pub fn put_str(&mut self, key: u8, value: &str) {
        self.put_bytes(key, ValueType::Utf8String, value.as_bytes());
    }

    /// Write a length-prefixed field (string, binary or image).
    pub fn put_bytes(&mut self, key: u8, value_type: ValueType, data: &[u8]) {
        self.put_header(key, value_type);
        // Oversized values are rejected by `finish`.
        self.dst.put_u32(data.len() as u32);
        self.dst.put_slice(data);
    }

    /// Number of parts written so far.
    pub fn parts(&self) -> usize {
        self.parts
    }

    fn put_header(&mut self, key: u8, value_type: ValueType) {
        self.dst.put_u8(key);
        self.dst.put_u8(value_type.code());
        self.parts += 1;
    }

    /// Backpatch the body length and part count. Returns the frame's wire size.
    pub fn finish(self) -> Result<usize> {
        let parts = u16::try_from(self.parts)
            .map_err(|_| FrameError::TooManyParts { count: self.parts })?;
        let size = self.dst.len() - self.start;
        let body_len = size - LENGTH_PREFIX_SIZE;
        if body_len >= MAX_FRAME_SIZE {
            return Err(FrameError::FrameTooLarge {
                size: body_len,
                max: MAX_FRAME_SIZE - 1,
            });
        }

        let length_at = self.start;
        let count_at = length_at + LENGTH_PREFIX_SIZE;
        self.dst[length_at..count_at].copy_from_slice(&(body_len as u32).to_be_bytes());
        self.dst[count_at..count_at + PART_COUNT_SIZE].copy_from_slice(&parts.to_be_bytes());
        Ok(size)
    }
}

/// Append one record to `dst` as a complete frame.
///
/// Returns the number of bytes written. On error `dst` is left as it was.
pub fn write_record(record: &Record, dst: &mut BytesMut) -> Result<usize> {
    let start = dst.len();
    let result = write_parts(record, dst);
    if result.is_err() {
        dst.truncate(start);
    }
    result
}

fn write_parts(record: &Record, dst: &mut BytesMut) -> Result<usize> {
    let sequence = record.sequence();
    let sequence = i64::try_from(sequence)
        .map_err(|_| FrameError::UnsupportedIntegerWidth { value: sequence })?;

    let mut parts = PartWriter::begin(dst);
    parts.put_int(key::SEQUENCE_NUMBER, sequence);
    parts.put_int(key::MESSAGE_TYPE, record.kind().code());

    match record {
        Record::Disconnect { .. } | Record::BlockDelimiter { .. } => {}
        Record::Marker { text, .. } => parts.put_str(key::MESSAGE, text),
        Record::ClientInfo { info, .. } => write_client_info(&mut parts, info),
        Record::Log { message, .. } => write_log(&mut parts, message)?,
    }

    parts.finish()
}

fn write_client_info(parts: &mut PartWriter<'_>, info: &ClientInfo) {
    parts.put_str(key::CLIENT_NAME, &info.client_name);
    parts.put_str(key::CLIENT_MODEL, &info.client_model);
    parts.put_str(key::CLIENT_UID, &info.client_uid);
    parts.put_str(key::CLIENT_VERSION, &info.client_version);
    parts.put_str(key::OS_NAME, &info.os_name);
    parts.put_str(key::OS_VERSION, &info.os_version);
}

fn write_log(parts: &mut PartWriter<'_>, message: &LogMessage) -> Result<()> {
    parts.put_int(key::TIMESTAMP_SECONDS, message.timestamp.seconds);
    parts.put_int(key::TIMESTAMP_MICROS, message.timestamp.micros);
    parts.put_str(key::THREAD_ID, &message.thread);

    for tag in &message.tags {
        parts.put_str(key::TAG, tag);
    }

    if message.level > 0 {
        parts.put_int(key::LEVEL, message.level);
    }

    for (&custom_key, value) in &message.user_info {
        if !is_custom(custom_key) {
            return Err(FrameError::InvalidCustomFieldKey(custom_key));
        }
        parts.put_bytes(custom_key, ValueType::BinaryData, value);
    }

    if let Some(filename) = message.filename.as_deref().filter(|s| !s.is_empty()) {
        parts.put_str(key::FILE, filename);
    }
    if let Some(function) = message.function.as_deref().filter(|s| !s.is_empty()) {
        parts.put_str(key::FUNCTION, function);
    }
    if message.line != 0 {
        parts.put_int(key::LINE, message.line);
    }

    match &message.payload {
        Payload::Text(text) => parts.put_str(key::MESSAGE, text),
        Payload::Binary(data) => parts.put_bytes(key::MESSAGE, ValueType::BinaryData, data),
        Payload::Image {
            data,
            width,
            height,
        } => {
            parts.put_bytes(key::MESSAGE, ValueType::ImageData, data);
            if let Some(width) = width.filter(|w| *w > 0) {
                parts.put_int(key::IMAGE_WIDTH, width);
            }
            if let Some(height) = height.filter(|h| *h > 0) {
                parts.put_int(key::IMAGE_HEIGHT, height);
            }
        }
    }

    Ok(())
}
