mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "logmate", version, about = "Binary log-record collector and tools")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "logmate",
            "send",
            "127.0.0.1:50007",
            "--message",
            "hello",
            "--message",
            "world",
            "--tag",
            "net",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.message, ["hello", "world"]);
                assert_eq!(args.tag, ["net"]);
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn listen_address_defaults() {
        let cli = Cli::try_parse_from(["logmate", "listen", "--count", "3"])
            .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.addr, cmd::DEFAULT_ADDR);
                assert_eq!(args.count, Some(3));
            }
            other => panic!("expected listen, got {other:?}"),
        }
    }

    #[test]
    fn parses_decode_with_global_format() {
        let cli = Cli::try_parse_from(["logmate", "decode", "capture.bin", "--format", "pretty"])
            .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Pretty)));
    }

    #[test]
    fn rejects_unknown_format() {
        let err = Cli::try_parse_from(["logmate", "--format", "xml", "version"])
            .expect_err("unknown format should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
