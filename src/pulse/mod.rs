//! Pulse capture and signal isolation
//!
//! The radio side hands us a continuous stream of (level, duration) pulses.
//! This module owns:
//! 1. The bounded ring the producer writes into ([`PulseRing`])
//! 2. The scanner that isolates the best coherent run out of the ring and
//!    converts it to a symbol bitmap ([`SignalScanner`])
//! 3. The capture controller that wires reader thread, scanner and decoder
//!    registry together ([`PulseCapture`])

pub mod capture;
mod ring;
mod scanner;

pub use capture::{CaptureStats, DecodedMessage, PulseCapture};
pub use ring::{Pulse, PulseRing};
pub use scanner::{duration_delta, DetectedSignal, SignalScanner};
