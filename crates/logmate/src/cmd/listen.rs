use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use logmate_frame::{FrameConfig, FrameError, LifecycleEvent, Record, RecordReader};
use tracing::{debug, info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_event, print_record, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Output produced by a connection thread, printed by the main thread.
enum Received {
    Event(String, LifecycleEvent),
    Record(String, Record),
}

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener =
        TcpListener::bind(&args.addr).map_err(|err| io_error("bind failed", err))?;
    let local = listener
        .local_addr()
        .map_err(|err| io_error("bind failed", err))?;
    info!(addr = %local, "log server listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut config = FrameConfig::default();
    if let Some(max) = args.max_frame_size {
        config.max_frame_size = max;
    }

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("accept".to_string())
        .spawn(move || accept_loop(listener, config, tx))
        .map_err(|err| io_error("failed starting accept thread", err))?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let received = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(received) => received,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match received {
            Received::Event(peer, event) => print_event(&event, &peer, format),
            Received::Record(peer, record) => {
                print_record(&record, &peer, format);
                printed = printed.saturating_add(1);

                if let Some(count) = args.count {
                    if printed >= count {
                        return Ok(SUCCESS);
                    }
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn accept_loop(listener: TcpListener, config: FrameConfig, tx: Sender<Received>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "accept failed");
                continue;
            }
        };

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        info!(peer = %peer, "client connection accepted");

        let tx = tx.clone();
        let config = config.clone();
        let spawned = thread::Builder::new()
            .name(format!("conn-{peer}"))
            .spawn(move || serve_connection(stream, peer, config, tx));
        if let Err(err) = spawned {
            warn!(error = %err, "failed starting connection thread");
        }
    }
}

/// Decode one connection until EOF, a decode error, or the printer goes away.
fn serve_connection(stream: TcpStream, peer: String, config: FrameConfig, tx: Sender<Received>) {
    let _ = stream.set_nodelay(true);
    let mut reader = match RecordReader::with_config_tcp(stream, config) {
        Ok(reader) => reader,
        Err(err) => {
            warn!(peer = %peer, error = %err, "failed configuring connection");
            return;
        }
    };

    loop {
        let record = match reader.read_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(FrameError::ConnectionClosed) => {
                warn!(peer = %peer, bytes = reader.buffered(), "stream ended mid-frame");
                break;
            }
            Err(FrameError::Io(err)) => {
                warn!(peer = %peer, error = %err, "read failed");
                return;
            }
            Err(err) => {
                warn!(peer = %peer, error = %err, "closing corrupted stream");
                return;
            }
        };

        if let Some(event) = LifecycleEvent::from_record(&record) {
            if tx.send(Received::Event(peer.clone(), event)).is_err() {
                return;
            }
        }
        if tx.send(Received::Record(peer.clone(), record)).is_err() {
            return;
        }
    }

    debug!(peer = %peer, "client connection closed");
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
