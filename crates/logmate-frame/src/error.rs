/// Errors that can occur during record encoding/decoding.
///
/// Running out of input is never an error: decoders report it as `Ok(None)`.
/// Every decode-side variant means the stream is corrupted and the
/// connection should be dropped; the codec does not resynchronize.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The declared frame body length is zero or implausibly large.
    #[error("invalid frame size ({size} bytes)")]
    InvalidFrameSize { size: u32 },

    /// The frame has no `messageType` field.
    #[error("frame has no message type field")]
    MissingMessageType,

    /// The `messageType` field holds a code outside the message kind table.
    #[error("unknown message type {0}")]
    UnknownMessageType(i64),

    /// A field the record kind cannot do without is absent.
    #[error("missing required field `{0}`")]
    MissingRequiredField(&'static str),

    /// A custom-range field carries something other than binary data.
    #[error("custom field {key} has unsupported value type {value_type}")]
    UnsupportedCustomFieldType { key: u8, value_type: u8 },

    /// A user info key lies below the custom field range.
    #[error("user info key {0} is outside the custom field range")]
    InvalidCustomFieldKey(u8),

    /// An integer needs more than 64 signed bits on the wire.
    #[error("integer {value} does not fit a 16, 32 or 64-bit field")]
    UnsupportedIntegerWidth { value: u64 },

    /// A string field holds bytes that are not valid UTF-8.
    #[error("field {key} is not valid UTF-8")]
    StringEncoding { key: u8 },

    /// A part carries a value type tag outside the value type table.
    #[error("field {key} has unknown value type {tag}")]
    UnknownValueType { key: u8, tag: u8 },

    /// A part extends past the end of its frame.
    #[error("malformed part at body offset {offset}")]
    MalformedPart { offset: usize },

    /// The sequence number on the wire is negative.
    #[error("invalid sequence number {0}")]
    InvalidSequence(i64),

    /// An encoded frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// A record needs more parts than the 16-bit part count can hold.
    #[error("too many parts ({count}, max {max})", max = u16::MAX)]
    TooManyParts { count: usize },

    /// An I/O error occurred while reading or writing records.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
