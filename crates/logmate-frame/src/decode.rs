use bytes::Bytes;
use tracing::debug;

use crate::error::{FrameError, Result};
use crate::fields::{key, MessageKind, ValueType};
use crate::frame::FrameHeader;
use crate::part::PartList;
use crate::record::{ClientInfo, LogMessage, Payload, Record, Timestamp};

/// Decode the body of a classified frame into a record.
///
/// Returns `Ok(None)` for a log frame without a payload or timestamp; older
/// producers emit those and they are dropped rather than failing the stream.
pub fn decode_body(header: &FrameHeader, body: &[u8]) -> Result<Option<Record>> {
    let parts = PartList::new(body)?;
    let sequence = header.sequence;

    let record = match header.kind {
        MessageKind::Log => match decode_log(&parts) {
            Ok(message) => Record::Log { sequence, message },
            Err(FrameError::MissingRequiredField(field)) => {
                debug!(sequence, field, "dropping log frame without required field");
                return Ok(None);
            }
            Err(err) => return Err(err),
        },
        MessageKind::BlockStart | MessageKind::BlockEnd => Record::BlockDelimiter {
            sequence,
            start: header.kind == MessageKind::BlockStart,
        },
        MessageKind::ClientInfo => Record::ClientInfo {
            sequence,
            info: decode_client_info(&parts)?,
        },
        MessageKind::Marker => Record::Marker {
            sequence,
            text: parts.string(key::MESSAGE)?.unwrap_or_default(),
        },
        MessageKind::Disconnect => Record::Disconnect { sequence },
    };

    Ok(Some(record))
}

fn decode_log(parts: &PartList<'_>) -> Result<LogMessage> {
    let payload_part = parts
        .find(key::MESSAGE)?
        .ok_or(FrameError::MissingRequiredField("message"))?;
    let timestamp = decode_timestamp(parts)?;

    let payload = match payload_part.value_type {
        ValueType::Utf8String => {
            Payload::Text(payload_part.as_str()?.unwrap_or_default().to_owned())
        }
        ValueType::BinaryData => Payload::Binary(Bytes::copy_from_slice(payload_part.data)),
        ValueType::ImageData => Payload::Image {
            data: Bytes::copy_from_slice(payload_part.data),
            width: parts.int(key::IMAGE_WIDTH)?,
            height: parts.int(key::IMAGE_HEIGHT)?,
        },
        ValueType::Int16 | ValueType::Int32 | ValueType::Int64 => {
            return Err(FrameError::MissingRequiredField("message"));
        }
    };

    let mut tags = Vec::new();
    for part in parts.find_all(key::TAG)? {
        if let Some(tag) = part.as_str()? {
            tags.push(tag.to_owned());
        }
    }

    Ok(LogMessage {
        timestamp,
        tags,
        thread: parts.string(key::THREAD_ID)?.unwrap_or_default(),
        level: parts.int(key::LEVEL)?.unwrap_or(0),
        user_info: parts.custom_fields()?,
        filename: parts.string(key::FILE)?,
        function: parts.string(key::FUNCTION)?,
        line: parts.int(key::LINE)?.unwrap_or(0),
        payload,
    })
}

/// Seconds are mandatory. Millis and micros are both optional and both add
/// to the sub-second part when present.
fn decode_timestamp(parts: &PartList<'_>) -> Result<Timestamp> {
    let seconds = parts
        .int(key::TIMESTAMP_SECONDS)?
        .ok_or(FrameError::MissingRequiredField("timestampSeconds"))?;

    let mut micros = 0i64;
    if let Some(millis) = parts.int(key::TIMESTAMP_MILLIS)? {
        micros = millis.saturating_mul(1000);
    }
    if let Some(us) = parts.int(key::TIMESTAMP_MICROS)? {
        micros = micros.saturating_add(us);
    }

    Ok(Timestamp { seconds, micros })
}

fn decode_client_info(parts: &PartList<'_>) -> Result<ClientInfo> {
    Ok(ClientInfo {
        client_name: parts.string(key::CLIENT_NAME)?.unwrap_or_default(),
        client_version: parts.string(key::CLIENT_VERSION)?.unwrap_or_default(),
        client_model: parts.string(key::CLIENT_MODEL)?.unwrap_or_default(),
        client_uid: parts.string(key::CLIENT_UID)?.unwrap_or_default(),
        os_name: parts.string(key::OS_NAME)?.unwrap_or_default(),
        os_version: parts.string(key::OS_VERSION)?.unwrap_or_default(),
    })
}
