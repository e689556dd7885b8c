//! Wire code tables.
//!
//! Field keys 0-99 are reserved for the fixed fields below.
//! Keys 100-255 carry producer-defined binary attachments (user info).
//! These numbers are shared with every existing producer and never change.

/// Field keys.
pub mod key {
    /// The record kind, one of [`MessageKind`](super::MessageKind).
    pub const MESSAGE_TYPE: u8 = 0;
    pub const TIMESTAMP_SECONDS: u8 = 1;
    pub const TIMESTAMP_MILLIS: u8 = 2;
    pub const TIMESTAMP_MICROS: u8 = 3;
    pub const THREAD_ID: u8 = 4;
    pub const TAG: u8 = 5;
    pub const LEVEL: u8 = 6;
    /// Log payload (text, binary or image) and marker text.
    pub const MESSAGE: u8 = 7;
    pub const IMAGE_WIDTH: u8 = 8;
    pub const IMAGE_HEIGHT: u8 = 9;
    pub const SEQUENCE_NUMBER: u8 = 10;
    pub const FILE: u8 = 11;
    pub const LINE: u8 = 12;
    pub const FUNCTION: u8 = 13;

    pub const CLIENT_NAME: u8 = 20;
    pub const CLIENT_VERSION: u8 = 21;
    pub const OS_NAME: u8 = 22;
    pub const OS_VERSION: u8 = 23;
    pub const CLIENT_MODEL: u8 = 24;
    pub const CLIENT_UID: u8 = 25;
}

/// First key of the custom (user info) range.
pub const FIRST_CUSTOM_KEY: u8 = 100;

/// Record kinds carried in the `messageType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Log,
    BlockStart,
    BlockEnd,
    ClientInfo,
    Disconnect,
    Marker,
}

impl MessageKind {
    /// Look up a kind by its wire code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Log),
            1 => Some(Self::BlockStart),
            2 => Some(Self::BlockEnd),
            3 => Some(Self::ClientInfo),
            4 => Some(Self::Disconnect),
            5 => Some(Self::Marker),
            _ => None,
        }
    }

    /// The wire code of this kind.
    pub fn code(self) -> i64 {
        match self {
            Self::Log => 0,
            Self::BlockStart => 1,
            Self::BlockEnd => 2,
            Self::ClientInfo => 3,
            Self::Disconnect => 4,
            Self::Marker => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Log => "LOG",
            Self::BlockStart => "BLOCK_START",
            Self::BlockEnd => "BLOCK_END",
            Self::ClientInfo => "CLIENT_INFO",
            Self::Disconnect => "DISCONNECT",
            Self::Marker => "MARKER",
        }
    }
}

/// Value type tags.
///
/// String, binary and image values carry a 32-bit length prefix; integer
/// widths are implied by the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Utf8String,
    BinaryData,
    Int16,
    Int32,
    Int64,
    ImageData,
}

impl ValueType {
    /// Look up a value type by its wire tag.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Utf8String),
            1 => Some(Self::BinaryData),
            2 => Some(Self::Int16),
            3 => Some(Self::Int32),
            4 => Some(Self::Int64),
            5 => Some(Self::ImageData),
            _ => None,
        }
    }

    /// The wire tag of this value type.
    pub fn code(self) -> u8 {
        match self {
            Self::Utf8String => 0,
            Self::BinaryData => 1,
            Self::Int16 => 2,
            Self::Int32 => 3,
            Self::Int64 => 4,
            Self::ImageData => 5,
        }
    }

    /// Size of an integer value in bytes, `None` for length-prefixed types.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Int16 => Some(2),
            Self::Int32 => Some(4),
            Self::Int64 => Some(8),
            Self::Utf8String | Self::BinaryData | Self::ImageData => None,
        }
    }
}

/// Returns a human-readable name for a field key.
pub fn key_name(key: u8) -> &'static str {
    match key {
        key::MESSAGE_TYPE => "messageType",
        key::TIMESTAMP_SECONDS => "timestampSeconds",
        key::TIMESTAMP_MILLIS => "timestampMillis",
        key::TIMESTAMP_MICROS => "timestampMicros",
        key::THREAD_ID => "threadID",
        key::TAG => "tag",
        key::LEVEL => "level",
        key::MESSAGE => "message",
        key::IMAGE_WIDTH => "imageWidth",
        key::IMAGE_HEIGHT => "imageHeight",
        key::SEQUENCE_NUMBER => "sequenceNumber",
        key::FILE => "file",
        key::LINE => "line",
        key::FUNCTION => "function",
        key::CLIENT_NAME => "clientName",
        key::CLIENT_VERSION => "clientVersion",
        key::OS_NAME => "osName",
        key::OS_VERSION => "osVersion",
        key::CLIENT_MODEL => "clientModel",
        key::CLIENT_UID => "clientUID",
        FIRST_CUSTOM_KEY..=u8::MAX => "custom",
        _ => "RESERVED",
    }
}

/// Returns true if the key lies in the custom (user info) range.
pub fn is_custom(key: u8) -> bool {
    key >= FIRST_CUSTOM_KEY
}
