use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use logmate_frame::{ClientInfo, LifecycleEvent, LogMessage, Payload, Record, Timestamp};
use serde::Serialize;

const HEX_DUMP_WIDTH: usize = 16;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ClientOutput<'a> {
    name: &'a str,
    version: &'a str,
    model: &'a str,
    uid: &'a str,
    os_name: &'a str,
    os_version: &'a str,
}

impl<'a> From<&'a ClientInfo> for ClientOutput<'a> {
    fn from(info: &'a ClientInfo) -> Self {
        Self {
            name: &info.client_name,
            version: &info.client_version,
            model: &info.client_model,
            uid: &info.client_uid,
            os_name: &info.os_name,
            os_version: &info.os_version,
        }
    }
}

#[derive(Serialize, Default)]
struct RecordOutput<'a> {
    source: &'a str,
    kind: &'static str,
    sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_micros: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    user_info: BTreeMap<u8, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client: Option<ClientOutput<'a>>,
}

impl<'a> RecordOutput<'a> {
    fn new(record: &'a Record, source: &'a str) -> Self {
        let mut out = Self {
            source,
            kind: record.kind().name(),
            sequence: record.sequence(),
            ..Self::default()
        };

        match record {
            Record::Disconnect { .. } => {}
            Record::BlockDelimiter { start, .. } => out.block_start = Some(*start),
            Record::Marker { text, .. } => out.text = Some(text),
            Record::ClientInfo { info, .. } => out.client = Some(info.into()),
            Record::Log { message, .. } => out.fill_log(message),
        }
        out
    }

    fn fill_log(&mut self, message: &'a LogMessage) {
        self.timestamp_seconds = Some(message.timestamp.seconds);
        self.timestamp_micros = Some(message.timestamp.micros);
        self.thread = Some(&message.thread);
        self.tags = message.tags.iter().map(String::as_str).collect();
        self.level = (message.level != 0).then_some(message.level);
        self.filename = message.filename.as_deref();
        self.function = message.function.as_deref();
        self.line = (message.line != 0).then_some(message.line);
        self.user_info = message
            .user_info
            .iter()
            .map(|(key, value)| (*key, hex(value)))
            .collect();

        match &message.payload {
            Payload::Text(text) => {
                self.payload_type = Some("text");
                self.text = Some(text);
            }
            Payload::Binary(data) => {
                self.payload_type = Some("binary");
                self.size = Some(data.len());
                self.data = Some(hex(data));
            }
            Payload::Image {
                data,
                width,
                height,
            } => {
                self.payload_type = Some("image");
                self.size = Some(data.len());
                self.width = *width;
                self.height = *height;
            }
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    source: &'a str,
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_name: Option<&'a str>,
}

pub fn print_record(record: &Record, source: &str, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Json => render_json(&RecordOutput::new(record, source)),
        OutputFormat::Table => render_table(record, source),
        OutputFormat::Pretty => render_pretty(record),
    };
    print_block(&rendered);
}

pub fn print_event(event: &LifecycleEvent, source: &str, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Json => {
            let (name, client_name) = match event {
                LifecycleEvent::Connected(info) => ("connected", Some(info.client_name.as_str())),
                LifecycleEvent::Disconnected => ("disconnected", None),
            };
            render_json(&EventOutput {
                source,
                event: name,
                client_name,
            })
        }
        OutputFormat::Table | OutputFormat::Pretty => render_event_banner(event),
    };
    print_block(&rendered);
}

fn print_block(rendered: &str) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{rendered}");
    let _ = out.flush();
}

fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn render_table(record: &Record, source: &str) -> String {
    let (time, thread, message) = match record {
        Record::Log { message, .. } => (
            format_time(message.timestamp),
            message.thread.clone(),
            payload_summary(&message.payload),
        ),
        Record::Marker { text, .. } => (String::new(), String::new(), text.clone()),
        Record::ClientInfo { info, .. } => (
            String::new(),
            String::new(),
            format!(
                "{} {} {} ({} {})",
                info.client_name, info.client_model, info.client_version, info.os_name, info.os_version
            ),
        ),
        Record::BlockDelimiter { .. } | Record::Disconnect { .. } => {
            (String::new(), String::new(), String::new())
        }
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["SEQ", "KIND", "TIME", "THREAD", "SOURCE", "MESSAGE"])
        .add_row(vec![
            record.sequence().to_string(),
            record.kind().name().to_string(),
            time,
            thread,
            source.to_string(),
            message,
        ]);
    table.to_string()
}

/// Console rendering: `[seq] time | thread | message`, with a hex dump
/// under binary payloads.
pub fn render_pretty(record: &Record) -> String {
    let mut out = String::new();

    match record {
        Record::Log { sequence, message } => {
            let header = format!("[{sequence}] {}", format_time(message.timestamp));
            let left = format!("{header} | {} |", message.thread);
            match &message.payload {
                Payload::Text(text) => {
                    let _ = write!(out, "{left} {text}");
                }
                Payload::Binary(data) => {
                    let _ = write!(out, "{left} Binary data, {} bytes:", data.len());
                    let indent = " ".repeat(left.chars().count() + 1);
                    for line in hex_dump(data) {
                        let _ = write!(out, "\n{indent}{line}");
                    }
                }
                Payload::Image { .. } => {
                    let _ = write!(out, "{left} {}", payload_summary(&message.payload));
                }
            }
        }
        Record::Marker { sequence, text } => {
            let _ = write!(out, "[{sequence}]  **** MARK **** {text}");
        }
        Record::ClientInfo { sequence, info } => {
            let header = format!("[{sequence}] ");
            let indent = " ".repeat(header.len());
            let _ = writeln!(out, "{header} **** CLIENT INFO ***");
            let _ = writeln!(
                out,
                "{indent} {} {} {}",
                info.client_name, info.client_model, info.client_version
            );
            let _ = writeln!(out, "{indent} {} {}", info.os_name, info.os_version);
            let _ = write!(out, "{indent} ********************");
        }
        Record::BlockDelimiter { sequence, start } => {
            let which = if *start { "START" } else { "END" };
            let _ = write!(out, "[{sequence}]  ---- BLOCK {which} ----");
        }
        Record::Disconnect { sequence } => {
            let _ = write!(out, "[{sequence}]  ---- DISCONNECT ----");
        }
    }
    out
}

fn render_event_banner(event: &LifecycleEvent) -> String {
    match event {
        LifecycleEvent::Connected(_) => "\n\n************ CLIENT CONNECTED ************".to_string(),
        LifecycleEvent::Disconnected => "************ CLIENT DISCONNECTED ************".to_string(),
    }
}

fn payload_summary(payload: &Payload) -> String {
    match payload {
        Payload::Text(text) => text.clone(),
        Payload::Binary(data) => format!("Binary data, {} bytes", data.len()),
        Payload::Image {
            data,
            width: Some(width),
            height: Some(height),
        } => format!("Image ({width} x {height}), {} bytes", data.len()),
        Payload::Image { data, .. } => format!("Image, {} bytes.", data.len()),
    }
}

/// UTC wall-clock time of day with millisecond precision.
pub fn format_time(timestamp: Timestamp) -> String {
    let total_micros =
        i128::from(timestamp.seconds) * 1_000_000 + i128::from(timestamp.micros);
    let seconds = total_micros.div_euclid(1_000_000);
    let millis = total_micros.rem_euclid(1_000_000) / 1000;
    let of_day = seconds.rem_euclid(86_400);

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        of_day / 3600,
        (of_day / 60) % 60,
        of_day % 60,
        millis
    )
}

/// Sixteen bytes per line: hex column padded to a fixed width, then ASCII.
pub fn hex_dump(data: &[u8]) -> Vec<String> {
    data.chunks(HEX_DUMP_WIDTH)
        .map(|chunk| {
            let mut hex_col = String::with_capacity(HEX_DUMP_WIDTH * 3);
            let mut ascii = String::with_capacity(HEX_DUMP_WIDTH);
            for byte in chunk {
                let _ = write!(hex_col, "{byte:02X} ");
                ascii.push(if byte.is_ascii_graphic() || *byte == b' ' {
                    char::from(*byte)
                } else {
                    '.'
                });
            }
            format!("{hex_col:<width$}{ascii}", width = HEX_DUMP_WIDTH * 3)
        })
        .collect()
}

fn hex(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}
