//! Codec for the compact binary log-record wire format.
//!
//! A logging client emits structured records over a byte stream; a
//! collecting server decodes them incrementally as bytes arrive. Every
//! record is one frame:
//! - A 4-byte big-endian body length
//! - A 2-byte big-endian part count
//! - Parts: 1-byte field key, 1-byte value type, then the value
//!   (big-endian 16/32/64-bit signed integers, or a 4-byte length plus bytes)
//!
//! Keys 100 and above are reserved for user-defined binary fields.
//!
//! [`StreamDecoder`] turns arbitrary chunks into records, [`RecordReader`]
//! and [`RecordWriter`] wrap blocking streams, and with the `async` feature
//! [`LogCodec`] plugs into `tokio_util::codec`.

pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fields;
pub mod frame;
pub mod part;
pub mod reader;
pub mod record;
pub mod stream;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(test)]
mod testutil;

#[cfg(feature = "async")]
pub use async_codec::LogCodec;
pub use codec::{decode_record, encode_record, FrameConfig};
pub use error::{FrameError, Result};
pub use fields::{key, key_name, MessageKind, ValueType, FIRST_CUSTOM_KEY};
pub use frame::{detect_frame, FrameHeader, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};
pub use reader::RecordReader;
pub use record::{ClientInfo, LogMessage, Payload, Record, Timestamp, UserInfo};
pub use stream::{LifecycleEvent, StreamDecoder};
pub use writer::RecordWriter;
