//! Pulse capture controller
//!
//! Wires the pieces together: a reader thread parses (level, duration)
//! pulse lines from an external capture tool (stdin or a file) into the
//! ring, and a pipeline thread periodically scans the ring, demodulates the
//! best signal and runs it through the decoder registry. Decoded messages
//! flow to the caller over a bounded channel.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::ring::{Pulse, PulseRing};
use super::scanner::SignalScanner;
use crate::config::Config;
use crate::proto::{DecoderRegistry, MessageInfo};

/// Working buffer size for the demodulated symbol bitmap, in bytes
const DETECTED_BUF_BYTES: usize = 512;

/// Statistics for the capture pipeline (atomic for thread-safe access)
#[derive(Debug, Default)]
pub struct CaptureStats {
    pub pulses_captured: AtomicU64,
    pub parse_errors: AtomicU64,
    pub scans_performed: AtomicU64,
    pub signals_detected: AtomicU64,
    pub messages_decoded: AtomicU64,
    pub decode_failures: AtomicU64,
}

impl CaptureStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// A decoded message plus its capture context
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub info: MessageInfo,
    pub timestamp_ms: u64,
    /// Pulses in the coherent run the message came from
    pub run_pulses: usize,
}

/// Capture controller: owns the running flag and stats, spawns the threads
pub struct PulseCapture {
    config: Config,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
}

impl PulseCapture {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            stats: CaptureStats::new(),
        }
    }

    /// Start capturing and return a receiver for decoded messages
    pub fn start(&self, registry: DecoderRegistry) -> Result<Receiver<DecodedMessage>> {
        info!("Starting pulse capture");
        info!("  Source: {}", self.config.pulse_source);
        info!("  Ring capacity: {} pulses", self.config.ring_capacity);
        info!("  Scan interval: {} ms", self.config.scan_interval_ms);

        let (msg_tx, msg_rx) = bounded::<DecodedMessage>(100);

        let config = self.config.clone();
        let running = self.running.clone();
        let stats = self.stats.clone();

        running.store(true, Ordering::SeqCst);

        thread::Builder::new()
            .name("pulse-pipeline".to_string())
            .spawn(move || {
                if let Err(e) = run_pipeline(config, running, stats, registry, msg_tx) {
                    error!("Pulse pipeline error: {}", e);
                }
            })
            .context("Failed to spawn pipeline thread")?;

        Ok(msg_rx)
    }

    pub fn stop(&self) {
        info!("Stopping pulse capture...");
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &Arc<CaptureStats> {
        &self.stats
    }
}

impl Drop for PulseCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Open the configured pulse source ("-" means stdin)
fn open_source(config: &Config) -> Result<Box<dyn BufRead + Send>> {
    if config.pulse_source == "-" {
        Ok(Box::new(BufReader::new(std::io::stdin())))
    } else {
        let file = File::open(&config.pulse_source)
            .with_context(|| format!("Failed to open pulse source {}", config.pulse_source))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Scan/decode loop (runs in the pipeline thread)
fn run_pipeline(
    config: Config,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
    registry: DecoderRegistry,
    msg_tx: Sender<DecodedMessage>,
) -> Result<()> {
    let source = open_source(&config)?;
    let ring = Arc::new(PulseRing::new(config.ring_capacity));
    let eof = Arc::new(AtomicBool::new(false));

    // Producer: parse pulse lines into the ring. The ring snapshot taken by
    // the scanner is the only synchronization point with this thread.
    {
        let ring = ring.clone();
        let eof = eof.clone();
        let stats = stats.clone();
        let running = running.clone();
        thread::Builder::new()
            .name("pulse-reader".to_string())
            .spawn(move || {
                for line in source.lines() {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            error!("Error reading pulse source: {}", e);
                            break;
                        }
                    };
                    match parse_pulse_line(&line) {
                        Some(pulse) => {
                            ring.add(pulse);
                            stats.pulses_captured.fetch_add(1, Ordering::Relaxed);
                        }
                        None => {
                            if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                                stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                                debug!("Failed to parse pulse line: {}", line);
                            }
                        }
                    }
                }
                eof.store(true, Ordering::SeqCst);
            })
            .context("Failed to spawn reader thread")?;
    }

    let mut scanner = SignalScanner::new();
    let mut last_total = 0u64;

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(config.scan_interval_ms));
        stats.scans_performed.fetch_add(1, Ordering::Relaxed);

        if scanner.scan_for_signal(&ring) {
            stats.signals_detected.fetch_add(1, Ordering::Relaxed);
            if let Some(signal) = scanner.detected() {
                let bits = signal.to_symbol_bits(DETECTED_BUF_BYTES);
                debug!(
                    "signal: {} pulses, short pulse {}us, {} symbol bits",
                    signal.len(),
                    signal.short_pulse_us(),
                    bits.len()
                );

                match registry.decode(&bits) {
                    Some(info) => {
                        stats.messages_decoded.fetch_add(1, Ordering::Relaxed);
                        info!(">>> {} | {} bits | *{};", info.name, info.len, info.raw);
                        let msg = DecodedMessage {
                            info,
                            timestamp_ms: chrono::Utc::now().timestamp_millis() as u64,
                            run_pulses: signal.len(),
                        };
                        if msg_tx.try_send(msg).is_err() {
                            debug!("Message channel full, dropping message");
                        }
                    }
                    None => {
                        stats.decode_failures.fetch_add(1, Ordering::Relaxed);
                        debug!("no protocol matched ({} symbol bits)", bits.len());
                    }
                }
            }
        }

        // Source drained and every pulse scanned: nothing more will arrive
        let total = ring.total();
        if eof.load(Ordering::SeqCst) && total == last_total {
            info!("Pulse source exhausted");
            break;
        }
        last_total = total;
    }

    running.store(false, Ordering::SeqCst);
    info!(
        "Pipeline stopped. Pulses={}, Signals={}, Decoded={}, No-match={}",
        stats.pulses_captured.load(Ordering::Relaxed),
        stats.signals_detected.load(Ordering::Relaxed),
        stats.messages_decoded.load(Ordering::Relaxed),
        stats.decode_failures.load(Ordering::Relaxed)
    );

    if stats.parse_errors.load(Ordering::Relaxed) > 0 {
        warn!(
            "{} malformed pulse lines were skipped",
            stats.parse_errors.load(Ordering::Relaxed)
        );
    }

    Ok(())
}

/// Parse one pulse line: `<level> <duration_us>` where level is 0/1 or L/H
/// (case-insensitive). Comment (`#`) and blank lines yield None.
fn parse_pulse_line(line: &str) -> Option<Pulse> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut parts = line.split_whitespace();
    let level = match parts.next()? {
        "1" | "h" | "H" => true,
        "0" | "l" | "L" => false,
        _ => return None,
    };
    let duration: u32 = parts.next()?.parse().ok()?;
    if duration == 0 || parts.next().is_some() {
        return None;
    }

    Some(Pulse { level, duration })
}
