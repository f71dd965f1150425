//! # Nordic TX
//!
//! Enhanced ShockBurst transmit scheduler driven from standard input.
//!
//! Each stdin line holds one blob as whitespace-separated hex bytes:
//!
//! ```text
//! tx 02 05 03 00 00 02 E7 E7 E7 E7 E7 01 02 03   # queue a transmit request
//! rx AA E7 E7 E7 E7 E7 ...                      # parse a captured frame
//! ```
//!
//! Lines without a prefix are treated as `tx`. Rendered output is written to
//! stdout, one line per channel per tick; logs go to stderr or the
//! configured log file.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use nordic_tx::config::{Config, LoggingConfig, ReceiverConfig};
use nordic_tx::shockburst::decoder::try_parse;
use nordic_tx::shockburst::protocol::CaptureWindow;
use nordic_tx::transmitter::{NordicTx, TxQueueHandle};

/// Number of rendered packets between status log messages
const LOG_INTERVAL_PACKETS: u64 = 100;

/// Main entry point for Nordic TX
///
/// # Control Flow
///
/// 1. Load configuration (path from the first argument, defaults otherwise)
/// 2. Set up logging
/// 3. Feed stdin blobs into the transmit queue while a tokio interval drives
///    the render step
/// 4. Stop on Ctrl+C, or on stdin EOF once every queued request is rendered
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging)?;

    info!("Nordic TX v{} starting...", env!("CARGO_PKG_VERSION"));

    let channel_count = config.transmitter.channel_count;
    let buffer_size = config.transmitter.output_buffer_size;
    let (mut tx, handle) = NordicTx::new(channel_count)?;
    let mut handle = Some(handle);

    let mut buffers = vec![vec![0u8; buffer_size]; channel_count as usize];
    let mut reader = BufReader::new(tokio::io::stdin());
    // Kept across select! iterations so a partially read line survives cancellation
    let mut raw_line: Vec<u8> = Vec::new();
    let mut stdout = tokio::io::stdout();
    let mut tick = interval(Duration::from_millis(config.transmitter.tick_interval_ms));

    info!(
        "Rendering on {} channel(s) every {}ms",
        channel_count, config.transmitter.tick_interval_ms
    );

    let mut last_log_count: u64 = 0;

    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut raw_line), if handle.is_some() => {
                let read = read?;
                if let Some(handle) = &handle {
                    if !raw_line.is_empty() {
                        handle_raw_line(&raw_line, handle, &config.receiver);
                    }
                }
                raw_line.clear();

                if read == 0 {
                    debug!("Input closed, draining transmit queue");
                    handle = None;
                }
            }

            _ = tick.tick() => {
                match render_tick(&mut tx, buffer_size, &mut buffers) {
                    Ok(0) => {
                        if tx.is_finished() {
                            info!("All requests rendered");
                            break;
                        }
                    }
                    Ok(produced) => {
                        for (channel, buffer) in buffers.iter().enumerate() {
                            let line = format!("ch{}: {}\n", channel, hex_string(&buffer[..produced]));
                            stdout.write_all(line.as_bytes()).await?;
                        }
                        stdout.flush().await?;
                    }
                    Err(e) => warn!("Render tick failed: {}", e),
                }

                let rendered = tx.packets_rendered();
                if rendered - last_log_count >= LOG_INTERVAL_PACKETS {
                    info!("Rendered {} packets ({} dropped)", rendered, tx.requests_dropped());
                    last_log_count = rendered;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!(
        "Total packets rendered: {} ({} requests dropped)",
        tx.packets_rendered(),
        tx.requests_dropped()
    );

    Ok(())
}

/// Install the tracing subscriber
///
/// The returned guard must live as long as logging is needed; dropping it
/// flushes and stops the file writer.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = logging.level.parse()?;
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &logging.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("log file {} has no file name", path.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

/// A parsed stdin line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Transmit(Vec<u8>),
    Parse(Vec<u8>),
}

/// Parse one stdin line; `None` for blank lines and comments
fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let command = match line.split_once(char::is_whitespace) {
        Some(("tx", rest)) => Command::Transmit(parse_hex_bytes(rest)?),
        Some(("rx", rest)) => Command::Parse(parse_hex_bytes(rest)?),
        _ => Command::Transmit(parse_hex_bytes(line)?),
    };

    Ok(Some(command))
}

fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    text.split_whitespace()
        .map(|token| {
            u8::from_str_radix(token, 16).with_context(|| format!("invalid hex byte '{}'", token))
        })
        .collect()
}

fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clear every channel buffer, then run one render tick
///
/// The render step leaves `[L, 2L)` of the target buffer unwritten, so the
/// buffers are zeroed first to keep earlier packets out of the output.
fn render_tick(tx: &mut NordicTx, budget: usize, buffers: &mut [Vec<u8>]) -> nordic_tx::error::Result<usize> {
    for buffer in buffers.iter_mut() {
        buffer.fill(0);
    }

    let mut outputs: Vec<&mut [u8]> = buffers.iter_mut().map(|buffer| buffer.as_mut_slice()).collect();
    tx.work(budget, &mut outputs)
}

/// Handle one raw stdin line; bytes that are not UTF-8 are replaced, not fatal
fn handle_raw_line(raw: &[u8], handle: &TxQueueHandle, receiver: &ReceiverConfig) {
    handle_line(&String::from_utf8_lossy(raw), handle, receiver);
}

fn handle_line(line: &str, handle: &TxQueueHandle, receiver: &ReceiverConfig) {
    match parse_line(line) {
        Ok(Some(Command::Transmit(blob))) => {
            if let Err(e) = handle.enqueue(blob) {
                warn!("Failed to queue request: {}", e);
            }
        }
        Ok(Some(Command::Parse(capture))) => {
            let window = CaptureWindow::from_aligned(&capture);
            match try_parse(&window, receiver.address_length, receiver.crc_length) {
                Ok(packet) => info!("Parsed packet:\n{}", packet),
                Err(e) => debug!("No packet in capture: {}", e),
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Skipping input line: {:#}", e),
    }
}
