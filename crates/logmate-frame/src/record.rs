//! Decoded log records.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::fields::MessageKind;

/// Producer-defined binary attachments, keyed by custom field key (>= 100).
///
/// An empty map is written as no fields at all, so "no user info" and
/// "empty user info" are the same value.
pub type UserInfo = BTreeMap<u8, Bytes>;

/// One record of the log stream.
///
/// Every variant carries the producer-assigned `sequence`. A sequence of 0
/// cannot be told apart from a frame without a sequence field; both decode
/// as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// The producer is closing the connection.
    Disconnect { sequence: u64 },
    /// Start or end of a logical group of records.
    BlockDelimiter { sequence: u64, start: bool },
    /// A free-text checkpoint.
    Marker { sequence: u64, text: String },
    /// Producer identification, sent once per connection.
    ClientInfo { sequence: u64, info: ClientInfo },
    /// An application log message.
    Log { sequence: u64, message: LogMessage },
}

impl Record {
    /// The producer-assigned sequence number.
    pub fn sequence(&self) -> u64 {
        match self {
            Record::Disconnect { sequence }
            | Record::BlockDelimiter { sequence, .. }
            | Record::Marker { sequence, .. }
            | Record::ClientInfo { sequence, .. }
            | Record::Log { sequence, .. } => *sequence,
        }
    }

    /// The wire message kind this record is encoded as.
    pub fn kind(&self) -> MessageKind {
        match self {
            Record::Disconnect { .. } => MessageKind::Disconnect,
            Record::BlockDelimiter { start: true, .. } => MessageKind::BlockStart,
            Record::BlockDelimiter { start: false, .. } => MessageKind::BlockEnd,
            Record::Marker { .. } => MessageKind::Marker,
            Record::ClientInfo { .. } => MessageKind::ClientInfo,
            Record::Log { .. } => MessageKind::Log,
        }
    }
}

/// Identity of the producing application and host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_name: String,
    pub client_version: String,
    pub client_model: String,
    pub client_uid: String,
    pub os_name: String,
    pub os_version: String,
}

/// Seconds and microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub seconds: i64,
    pub micros: i64,
}

impl Timestamp {
    pub fn new(seconds: i64, micros: i64) -> Self {
        Self { seconds, micros }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Convert to a `SystemTime`, `None` if out of range.
    pub fn to_system_time(self) -> Option<SystemTime> {
        let offset = i128::from(self.seconds) * 1_000_000 + i128::from(self.micros);
        let magnitude = Duration::from_micros(u64::try_from(offset.unsigned_abs()).ok()?);
        if offset >= 0 {
            UNIX_EPOCH.checked_add(magnitude)
        } else {
            UNIX_EPOCH.checked_sub(magnitude)
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since) => Self {
                seconds: since.as_secs() as i64,
                micros: i64::from(since.subsec_micros()),
            },
            Err(err) => {
                let before = err.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut micros = -i64::from(before.subsec_micros());
                if micros < 0 {
                    seconds -= 1;
                    micros += 1_000_000;
                }
                Self { seconds, micros }
            }
        }
    }
}

/// The body of a log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
    Image {
        data: Bytes,
        width: Option<i64>,
        height: Option<i64>,
    },
}

/// An application log call.
///
/// `level` and `line` use 0 for "not set". Empty `filename` and `function`
/// strings are not written, so only `None` survives a round trip for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub timestamp: Timestamp,
    pub tags: Vec<String>,
    pub thread: String,
    pub level: i64,
    pub user_info: UserInfo,
    pub filename: Option<String>,
    pub function: Option<String>,
    pub line: i64,
    pub payload: Payload,
}

impl LogMessage {
    /// A message with the given payload and every optional field unset.
    pub fn new(timestamp: Timestamp, thread: impl Into<String>, payload: Payload) -> Self {
        Self {
            timestamp,
            tags: Vec::new(),
            thread: thread.into(),
            level: 0,
            user_info: UserInfo::new(),
            filename: None,
            function: None,
            line: 0,
            payload,
        }
    }

    /// A text message.
    pub fn text(timestamp: Timestamp, thread: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(timestamp, thread, Payload::Text(text.into()))
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }

    pub fn with_user_info(mut self, key: u8, value: impl Into<Bytes>) -> Self {
        self.user_info.insert(key, value.into());
        self
    }

    /// Attach the source location of the log call.
    pub fn with_location(
        mut self,
        filename: impl Into<String>,
        function: impl Into<String>,
        line: i64,
    ) -> Self {
        self.filename = Some(filename.into());
        self.function = Some(function.into());
        self.line = line;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_and_kind() {
        let record = Record::BlockDelimiter {
            sequence: 9,
            start: false,
        };
        assert_eq!(record.sequence(), 9);
        assert_eq!(record.kind(), MessageKind::BlockEnd);

        let record = Record::Log {
            sequence: 3,
            message: LogMessage::text(Timestamp::default(), "main", "hi"),
        };
        assert_eq!(record.sequence(), 3);
        assert_eq!(record.kind(), MessageKind::Log);
    }

    #[test]
    fn timestamp_system_time_conversion() {
        let ts = Timestamp::new(1549098266, 11101);
        let time = ts.to_system_time().unwrap();
        assert_eq!(Timestamp::from(time), ts);
    }

    #[test]
    fn timestamp_before_epoch() {
        let time = UNIX_EPOCH - Duration::from_micros(1_500_000);
        let ts = Timestamp::from(time);
        assert_eq!(ts, Timestamp::new(-2, 500_000));
        assert_eq!(ts.to_system_time(), Some(time));
    }

    #[test]
    fn builder_sets_fields() {
        let message = LogMessage::text(Timestamp::new(1, 2), "worker", "done")
            .with_tag("net")
            .with_tag("io")
            .with_level(3)
            .with_user_info(100, Bytes::from_static(b"\x01"))
            .with_location("main.rs", "run()", 12);

        assert_eq!(message.tags, vec!["net".to_string(), "io".to_string()]);
        assert_eq!(message.level, 3);
        assert_eq!(message.user_info.len(), 1);
        assert_eq!(message.filename.as_deref(), Some("main.rs"));
        assert_eq!(message.function.as_deref(), Some("run()"));
        assert_eq!(message.line, 12);
        assert_eq!(message.payload, Payload::Text("done".to_string()));
    }
}
