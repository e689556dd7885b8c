use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod send;
pub mod version;

/// Address the collecting server listens on unless told otherwise.
pub const DEFAULT_ADDR: &str = "127.0.0.1:50007";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept logging clients and print the records they send.
    Listen(ListenArgs),
    /// Connect to a server and send a short session of records.
    Send(SendArgs),
    /// Decode a captured byte stream.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    #[arg(default_value = DEFAULT_ADDR)]
    pub addr: String,
    /// Exit after receiving N records.
    #[arg(long)]
    pub count: Option<usize>,
    /// Largest accepted frame body, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Server address to connect to.
    #[arg(default_value = DEFAULT_ADDR)]
    pub addr: String,
    /// Text message to send (repeatable).
    #[arg(long, short = 'm')]
    pub message: Vec<String>,
    /// Tag attached to every message (repeatable).
    #[arg(long, short = 't')]
    pub tag: Vec<String>,
    /// Log level of every message.
    #[arg(long, default_value = "0")]
    pub level: i64,
    /// Thread name reported with every message.
    #[arg(long, default_value = "main")]
    pub thread: String,
    /// Marker to send before the messages.
    #[arg(long)]
    pub marker: Option<String>,
    /// Client name reported in the client info record.
    #[arg(long, default_value = "logmate")]
    pub client_name: String,
    /// Connect and write timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode, or `-` for stdin.
    pub path: PathBuf,
    /// Largest accepted frame body, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
