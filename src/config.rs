//! Configuration loaded from environment variables

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Pulse source: a capture file path, or "-" for stdin
    pub pulse_source: String,

    /// Tuned frequency in Hz (informational; the radio itself is external)
    pub frequency_hz: u64,

    /// Modulation label (informational)
    pub modulation: String,

    /// Capacity of the raw pulse ring
    pub ring_capacity: usize,

    /// How often the scanner looks for new signals, in milliseconds
    pub scan_interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            pulse_source: std::env::var("PULSE_SOURCE").unwrap_or_else(|_| "-".to_string()),

            frequency_hz: std::env::var("FREQUENCY_HZ")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(433_920_000),

            modulation: std::env::var("MODULATION").unwrap_or_else(|_| "FSK".to_string()),

            ring_capacity: std::env::var("RING_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4096),

            scan_interval_ms: std::env::var("SCAN_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(250),
        }
    }
}
