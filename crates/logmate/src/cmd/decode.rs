use std::collections::VecDeque;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use logmate_frame::{FrameConfig, Record, StreamDecoder};
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_event, print_record, OutputFormat};

const READ_CHUNK_SIZE: usize = 8 * 1024;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let source = args.path.display().to_string();
    let input: Box<dyn Read> = if args.path == Path::new("-") {
        Box::new(std::io::stdin().lock())
    } else {
        let file = File::open(&args.path)
            .map_err(|err| io_error(&format!("failed opening {source}"), err))?;
        Box::new(file)
    };

    let mut config = FrameConfig::default();
    if let Some(max) = args.max_frame_size {
        config.max_frame_size = max;
    }

    let decoded = decode_stream(input, StreamDecoder::with_config(config), &source, format)?;
    debug!(source = %source, records = decoded, "decode finished");
    Ok(SUCCESS)
}

/// Feed `input` through `decoder` chunk by chunk, printing as records
/// complete. Returns the number of records printed.
fn decode_stream<R: Read>(
    mut input: R,
    mut decoder: StreamDecoder,
    source: &str,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut printed = 0usize;
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let read = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error(&format!("failed reading {source}"), err)),
        };

        let mut events = VecDeque::new();
        let records = decoder
            .feed_with(&chunk[..read], |event| events.push_back(event))
            .map_err(|err| frame_error("decode failed", err))?;
        for record in &records {
            // Events arrive in the same order as the records that signal them.
            if matches!(record, Record::ClientInfo { .. } | Record::Disconnect { .. }) {
                if let Some(event) = events.pop_front() {
                    print_event(&event, source, format);
                }
            }
            print_record(record, source, format);
        }
        printed += records.len();
    }

    // Errors deferred behind the last records surface here.
    decoder
        .feed(&[])
        .map_err(|err| frame_error("decode failed", err))?;

    if decoder.buffered() > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "decode failed: {} trailing bytes do not form a complete frame",
                decoder.buffered()
            ),
        ));
    }

    Ok(printed)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;
    use logmate_frame::{encode_record, ClientInfo};

    use super::*;

    fn capture() -> Vec<u8> {
        let mut wire = BytesMut::new();
        let marker = Record::Marker {
            sequence: 1,
            text: "m".to_string(),
        };
        encode_record(&marker, &mut wire).unwrap();
        encode_record(&Record::Disconnect { sequence: 2 }, &mut wire).unwrap();
        wire.to_vec()
    }

    #[test]
    fn counts_decoded_records() {
        let printed = decode_stream(
            Cursor::new(capture()),
            StreamDecoder::new(),
            "test",
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(printed, 2);
    }

    #[test]
    fn trailing_partial_frame_is_an_error() {
        let mut wire = capture();
        wire.truncate(wire.len() - 2);

        let err = decode_stream(Cursor::new(wire), StreamDecoder::new(), "test", OutputFormat::Json)
            .unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("12 trailing bytes"));
    }

    #[test]
    fn corruption_behind_decoded_records_is_reported() {
        let mut wire = BytesMut::new();
        let hello = Record::ClientInfo {
            sequence: 0,
            info: ClientInfo {
                client_name: "app".to_string(),
                ..ClientInfo::default()
            },
        };
        encode_record(&hello, &mut wire).unwrap();
        wire.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

        let err = decode_stream(
            Cursor::new(wire.to_vec()),
            StreamDecoder::new(),
            "test",
            OutputFormat::Json,
        )
        .unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("invalid frame size (0 bytes)"));
    }

    #[test]
    fn corrupt_stream_is_an_error() {
        let err = decode_stream(
            Cursor::new(vec![0, 0, 0, 0, 0, 0]),
            StreamDecoder::new(),
            "test",
            OutputFormat::Json,
        )
        .unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("invalid frame size"));
    }
}
