use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use logmate_frame::{ClientInfo, FrameConfig, LogMessage, Record, RecordWriter, Timestamp};
use serde::Serialize;
use tracing::{debug, info};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct SendOutput<'a> {
    addr: &'a str,
    records_sent: usize,
    messages: usize,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let stream = connect(&args.addr, timeout)?;
    let _ = stream.set_nodelay(true);

    let config = FrameConfig {
        write_timeout: Some(timeout),
        ..FrameConfig::default()
    };
    let mut writer = RecordWriter::with_config_tcp(stream, config)
        .map_err(|err| frame_error("connect failed", err))?;

    let records = session_records(&args, local_client_info(&args.client_name), Timestamp::now());
    writer
        .write_records(&records)
        .map_err(|err| frame_error("send failed", err))?;
    info!(addr = %args.addr, records = records.len(), "session sent");

    let out = SendOutput {
        addr: &args.addr,
        records_sent: records.len(),
        messages: args.message.len(),
    };
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => println!(
            "sent {} records ({} messages) to {}",
            out.records_sent, out.messages, out.addr
        ),
    }

    Ok(SUCCESS)
}

fn connect(addr: &str, timeout: Duration) -> CliResult<TcpStream> {
    let addrs = addr
        .to_socket_addrs()
        .map_err(|err| io_error(&format!("cannot resolve {addr}"), err))?;

    let mut last_err = None;
    for candidate in addrs {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                debug!(addr = %candidate, "connected");
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }

    Err(match last_err {
        Some(err) => io_error("connect failed", err),
        None => CliError::new(USAGE, format!("{addr} resolved to no addresses")),
    })
}

fn local_client_info(name: &str) -> ClientInfo {
    ClientInfo {
        client_name: name.to_string(),
        client_version: env!("CARGO_PKG_VERSION").to_string(),
        client_model: std::env::consts::ARCH.to_string(),
        client_uid: format!("{name}-{}", std::process::id()),
        os_name: std::env::consts::OS.to_string(),
        os_version: String::new(),
    }
}

/// Client info, optional marker, one text message per `--message`, then a
/// disconnect. Sequence numbers count up from 0.
fn session_records(args: &SendArgs, info: ClientInfo, timestamp: Timestamp) -> Vec<Record> {
    let mut records = Vec::with_capacity(args.message.len() + 3);
    let mut sequence = 0u64;
    let mut next = || {
        let current = sequence;
        sequence += 1;
        current
    };

    records.push(Record::ClientInfo {
        sequence: next(),
        info,
    });

    if let Some(text) = &args.marker {
        records.push(Record::Marker {
            sequence: next(),
            text: text.clone(),
        });
    }

    for text in &args.message {
        let mut message = LogMessage::text(timestamp, args.thread.as_str(), text.as_str())
            .with_level(args.level);
        message.tags = args.tag.clone();
        records.push(Record::Log {
            sequence: next(),
            message,
        });
    }

    records.push(Record::Disconnect { sequence: next() });
    records
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
