//! Pulse Capture - sub-GHz pulse-timing stream decoder
//!
//! Consumes (level, duration) pulses from an external radio capture,
//! isolates coherent signal runs, demodulates them to symbol bitmaps and
//! decodes them into protocol messages (e.g. TPMS telemetry).

mod bits;
mod config;
mod proto;
mod pulse;

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use pulse::PulseCapture;

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .init();

    info!("===========================================");
    info!("   Pulse Capture - RF protocol decoder");
    info!("===========================================");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration:");
    info!("  Pulse source: {}", config.pulse_source);
    info!("  Frequency: {} MHz", config.frequency_hz as f64 / 1e6);
    info!("  Modulation: {}", config.modulation);
    info!("  Ring capacity: {}", config.ring_capacity);
    info!("  Scan interval: {} ms", config.scan_interval_ms);

    // Protocol decoders, in dispatch order
    let registry = proto::default_registry();
    info!("Registered protocol decoders: {}", registry.len());

    // Start the capture pipeline
    let capture = PulseCapture::new(config);
    let msg_rx = capture.start(registry)?;

    info!("===========================================");
    info!("  Capture started. Press Ctrl+C to stop.");
    info!("===========================================");

    let mut messages_seen = 0u64;
    let mut last_stats = Instant::now();

    // Main loop - receive decoded messages from the pipeline
    loop {
        match msg_rx.recv_timeout(Duration::from_millis(500)) {
            Ok(msg) => {
                messages_seen += 1;
                info!("Decoded message #{} [{}]", messages_seen, msg.info.name);
                info!("  Raw:  {}", msg.info.raw);
                for line in [
                    &msg.info.info1,
                    &msg.info.info2,
                    &msg.info.info3,
                    &msg.info.info4,
                ] {
                    if !line.is_empty() {
                        info!("  {}", line);
                    }
                }
                info!(
                    "  {} bits from {} pulses at t={}",
                    msg.info.len, msg.run_pulses, msg.timestamp_ms
                );
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                // No message this cycle; fall through to periodic tasks
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                warn!("Pipeline channel disconnected");
                break;
            }
        }

        // Periodic stats (every 5 seconds)
        if last_stats.elapsed() >= Duration::from_secs(5) {
            let stats = capture.stats();
            info!(
                "[Stats] Pulses: {} | Scans: {} | Signals: {} | Decoded: {} | No-match: {}",
                stats
                    .pulses_captured
                    .load(std::sync::atomic::Ordering::Relaxed),
                stats
                    .scans_performed
                    .load(std::sync::atomic::Ordering::Relaxed),
                stats
                    .signals_detected
                    .load(std::sync::atomic::Ordering::Relaxed),
                stats
                    .messages_decoded
                    .load(std::sync::atomic::Ordering::Relaxed),
                stats
                    .decode_failures
                    .load(std::sync::atomic::Ordering::Relaxed),
            );
            last_stats = Instant::now();
        }

        if !capture.is_running() {
            break;
        }
    }

    // Drain anything still in flight after the pipeline stopped
    while let Ok(msg) = msg_rx.try_recv() {
        messages_seen += 1;
        info!("Decoded message #{} [{}] *{};", messages_seen, msg.info.name, msg.info.raw);
    }

    capture.stop();
    info!("Shutdown complete. Messages decoded: {}", messages_seen);
    Ok(())
}
