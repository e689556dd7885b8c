use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::decode::decode_body;
use crate::encode::write_record;
use crate::error::Result;
use crate::frame::{detect_frame, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};
use crate::record::Record;

/// Encode a record into the wire format, appending to `dst`.
///
/// Wire format:
/// ```text
/// ┌────────────────┬──────────────┬───────────────────────────────────┐
/// │ Body length    │ Part count   │ Parts                             │
/// │ (4B BE)        │ (2B BE)      │ sequenceNumber, messageType, ...  │
/// └────────────────┴──────────────┴───────────────────────────────────┘
/// ```
///
/// Returns the number of bytes appended.
pub fn encode_record(record: &Record, dst: &mut BytesMut) -> Result<usize> {
    let written = write_record(record, dst)?;
    trace!(kind = record.kind().name(), sequence = record.sequence(), written, "encoded record");
    Ok(written)
}

/// Decode the next record from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. Log frames that
/// older producers send without a payload or timestamp are consumed and
/// skipped. On error nothing of the failing frame is consumed.
pub fn decode_record(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Record>> {
    loop {
        let Some(header) = detect_frame(src, max_frame_size)? else {
            return Ok(None); // Need more data
        };

        let record = decode_body(&header, &src[LENGTH_PREFIX_SIZE..header.wire_size()])?;
        src.advance(header.wire_size());
        trace!(kind = header.kind.name(), sequence = header.sequence, size = header.wire_size(), "decoded frame");

        if record.is_some() {
            return Ok(record);
        }
    }
}

/// Configuration for the record codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Exclusive upper bound on frame body length. Default and ceiling: 1e9.
    pub max_frame_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bytes::{BufMut, Bytes};

    use super::*;
    use crate::error::FrameError;
    use crate::record::{ClientInfo, LogMessage, Payload, Timestamp};
    use crate::testutil::{bytes_from_hex, multi_record_stream};

    fn roundtrip(record: Record) {
        let mut buf = BytesMut::new();
        encode_record(&record, &mut buf).unwrap();
        assert!(!buf.is_empty());

        let decoded = decode_record(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap();
        assert_eq!(decoded, record);
        assert!(buf.is_empty());
    }

    fn reference_time() -> Timestamp {
        Timestamp::new(1_700_000_000, 12345)
    }

    fn user_info() -> BTreeMap<u8, Bytes> {
        BTreeMap::from([
            (100, Bytes::new()),
            (
                101,
                Bytes::from(bytes_from_hex("FF CC 43 43 62 10 01 0E")),
            ),
        ])
    }

    fn test_data() -> Bytes {
        Bytes::from(bytes_from_hex(
            "01 02 03 04 05 06 07 08 09 AA BB CC DD EE FF 00",
        ))
    }

    #[test]
    fn roundtrip_minimal_empty_text() {
        roundtrip(Record::Log {
            sequence: 1,
            message: LogMessage::text(reference_time(), "", ""),
        });
    }

    #[test]
    fn roundtrip_complete_text() {
        roundtrip(Record::Log {
            sequence: 2342,
            message: LogMessage::text(reference_time(), "Main thread", "Some log message")
                .with_tag("some tag")
                .with_level(8)
                .with_location("main.rs", "main()", 19),
        });
    }

    #[test]
    fn roundtrip_text_with_user_info() {
        let mut message = LogMessage::text(reference_time(), "Main thread", "Some log message");
        message.user_info = user_info();
        roundtrip(Record::Log {
            sequence: 1,
            message,
        });
    }

    #[test]
    fn roundtrip_binary() {
        roundtrip(Record::Log {
            sequence: 6534534,
            message: LogMessage::new(reference_time(), "some thread", Payload::Binary(Bytes::new())),
        });

        let mut message =
            LogMessage::new(reference_time(), "some thread", Payload::Binary(test_data()))
                .with_tag("some tag")
                .with_level(1)
                .with_location(
                    "someFile.rs",
                    "some_long_function_name(with_arguments, and_more)",
                    123456,
                );
        message.user_info = user_info();
        roundtrip(Record::Log {
            sequence: 234523423,
            message,
        });
    }

    #[test]
    fn roundtrip_image() {
        roundtrip(Record::Log {
            sequence: 6534534,
            message: LogMessage::new(
                reference_time(),
                "some thread",
                Payload::Image {
                    data: Bytes::new(),
                    width: None,
                    height: None,
                },
            ),
        });
        roundtrip(Record::Log {
            sequence: 234523423,
            message: LogMessage::new(
                reference_time(),
                "some thread",
                Payload::Image {
                    data: test_data(),
                    width: Some(640),
                    height: Some(480),
                },
            )
            .with_tag("some tag")
            .with_level(1),
        });
    }

    #[test]
    fn roundtrip_multiple_tags() {
        roundtrip(Record::Log {
            sequence: 5,
            message: LogMessage::text(reference_time(), "io", "read")
                .with_tag("net")
                .with_tag("tcp")
                .with_tag("net"),
        });
    }

    #[test]
    fn roundtrip_negative_and_wide_integers() {
        roundtrip(Record::Log {
            sequence: u64::try_from(i64::MAX).unwrap(),
            message: LogMessage::text(Timestamp::new(-5_000_000_000, 999_999), "t", "x")
                .with_level(i64::from(i32::MAX) + 1)
                .with_location("a.c", "f", -70_000),
        });
    }

    #[test]
    fn roundtrip_other_kinds() {
        roundtrip(Record::Disconnect { sequence: 12345 });
        roundtrip(Record::Disconnect { sequence: 0 });
        roundtrip(Record::ClientInfo {
            sequence: 1,
            info: ClientInfo {
                client_name: "TestApplication".to_string(),
                client_version: "1.0".to_string(),
                client_model: "MacBookPro".to_string(),
                client_uid: "2312313131231312312312312".to_string(),
                os_name: "macOS".to_string(),
                os_version: "10.14".to_string(),
            },
        });
        roundtrip(Record::Marker {
            sequence: 23423,
            text: "Some test mark".to_string(),
        });
        roundtrip(Record::BlockDelimiter {
            sequence: 121231,
            start: true,
        });
        roundtrip(Record::BlockDelimiter {
            sequence: 121231,
            start: false,
        });
    }

    #[test]
    fn roundtrip_variable_sequence_width() {
        for sequence in [i16::MAX as u64, i32::MAX as u64, i64::MAX as u64] {
            roundtrip(Record::Disconnect { sequence });
        }
    }

    #[test]
    fn multiple_records_in_same_buffer() {
        let records = vec![
            Record::ClientInfo {
                sequence: 1,
                info: ClientInfo {
                    client_name: "TestApplication".to_string(),
                    ..ClientInfo::default()
                },
            },
            Record::Log {
                sequence: 1,
                message: {
                    let mut m = LogMessage::text(reference_time(), "Main thread", "Some log message");
                    m.user_info = user_info();
                    m
                },
            },
            Record::Log {
                sequence: 6534534,
                message: LogMessage::new(
                    reference_time(),
                    "some thread",
                    Payload::Image {
                        data: test_data(),
                        width: None,
                        height: None,
                    },
                ),
            },
            Record::Marker {
                sequence: 23423,
                text: "Some test mark".to_string(),
            },
            Record::Disconnect { sequence: 12345 },
        ];

        let mut buf = BytesMut::new();
        for record in &records {
            encode_record(record, &mut buf).unwrap();
        }
        for record in &records {
            assert_eq!(&decode_record(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap(), record);
        }
        assert!(decode_record(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
    }

    #[test]
    fn decodes_reference_stream_in_order() {
        let mut buf = BytesMut::from(multi_record_stream().as_slice());
        let mut records = Vec::new();
        while let Some(record) = decode_record(&mut buf, MAX_FRAME_SIZE).unwrap() {
            records.push(record);
        }
        assert!(buf.is_empty());
        assert_eq!(records.len(), 5);

        assert_eq!(
            records[0],
            Record::ClientInfo {
                sequence: 0,
                info: ClientInfo {
                    client_name: "My Application".to_string(),
                    client_version: "1.0".to_string(),
                    client_model: String::new(),
                    client_uid: "6871AB2E-7209-4661-B8D7-91ED7F4AED0E".to_string(),
                    os_name: "macOS".to_string(),
                    os_version: "10.14.1".to_string(),
                },
            }
        );

        let complete = LogMessage::text(
            Timestamp::new(1549098266, 11101),
            "Main thread",
            "Hello, world",
        )
        .with_tag("App")
        .with_level(1)
        .with_location("main.c", "someFunction()", 42);
        assert_eq!(
            records[1],
            Record::Log {
                sequence: 7,
                message: complete.clone(),
            }
        );

        let binary = LogMessage {
            timestamp: Timestamp::new(1549098266, 7000),
            payload: Payload::Binary(Bytes::from_static(b"Hello, world")),
            ..complete
        };
        assert_eq!(
            records[2],
            Record::Log {
                sequence: 7,
                message: binary,
            }
        );

        assert_eq!(
            records[3],
            Record::Log {
                sequence: 7,
                message: LogMessage::text(Timestamp::new(1549098266, 0), "", "Hello, world"),
            }
        );

        let image = LogMessage::new(
            Timestamp::new(1549098266, 0),
            "Main thread",
            Payload::Image {
                data: Bytes::from_static(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
                width: Some(1024),
                height: Some(768),
            },
        )
        .with_tag("App")
        .with_level(1);
        assert_eq!(
            records[4],
            Record::Log {
                sequence: 1,
                message: image,
            }
        );
    }

    #[test]
    fn skipped_legacy_frame_is_consumed() {
        // Log frame without timestamp, then a disconnect.
        let mut buf = BytesMut::from(
            bytes_from_hex(
                "00 00 00 0F  00 02  00 02 00 00  07 00 00 00 00 03 41 42 43
                 00 00 00 0A  00 02  0A 02 00 01  00 02 00 04",
            )
            .as_slice(),
        );
        let record = decode_record(&mut buf, MAX_FRAME_SIZE).unwrap();
        assert_eq!(record, Some(Record::Disconnect { sequence: 1 }));
        assert!(buf.is_empty());
    }

    #[test]
    fn incomplete_frame_consumes_nothing() {
        let mut full = BytesMut::new();
        encode_record(&Record::Disconnect { sequence: 1 }, &mut full).unwrap();

        for cut in 0..full.len() {
            let mut buf = BytesMut::from(&full[..cut]);
            assert!(decode_record(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
            assert_eq!(buf.len(), cut);
        }
    }

    #[test]
    fn corrupt_frame_consumes_nothing() {
        let mut buf = BytesMut::new();
        buf.put_slice(&bytes_from_hex("3E EF FF C0 00 05"));
        let err = decode_record(&mut buf, MAX_FRAME_SIZE).unwrap_err();
        assert!(matches!(err, FrameError::InvalidFrameSize { .. }));
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn default_config() {
        let config = FrameConfig::default();
        assert_eq!(config.max_frame_size, MAX_FRAME_SIZE);
        assert!(config.read_timeout.is_none());
        assert!(config.write_timeout.is_none());
    }
}
