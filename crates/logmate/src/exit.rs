use std::fmt;
use std::io;

use logmate_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::FrameTooLarge { .. }
        | FrameError::TooManyParts { .. }
        | FrameError::UnsupportedIntegerWidth { .. }
        | FrameError::InvalidCustomFieldKey(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_stream_is_data_invalid() {
        let err = frame_error("decode failed", FrameError::InvalidFrameSize { size: 0 });
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.to_string(), "decode failed: invalid frame size (0 bytes)");
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err = frame_error(
            "send failed",
            FrameError::Io(io::Error::from(io::ErrorKind::TimedOut)),
        );
        assert_eq!(err.code, TIMEOUT);

        let err = io_error("connect failed", io::Error::from(io::ErrorKind::ConnectionRefused));
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn encode_errors_are_usage() {
        let err = frame_error("send failed", FrameError::InvalidCustomFieldKey(3));
        assert_eq!(err.code, USAGE);

        let err = frame_error("send failed", FrameError::TooManyParts { count: 70_000 });
        assert_eq!(err.code, USAGE);
        assert_eq!(err.to_string(), "send failed: too many parts (70000, max 65535)");
    }
}
