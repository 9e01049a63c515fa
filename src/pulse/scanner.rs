//! Signal isolation: find the best coherent pulse run in the capture ring
//!
//! Real captures are mostly noise with an occasional burst of protocol
//! traffic. A burst stands out because its pulse durations cluster into a
//! small number of timing classes (short and long marks/spaces), while noise
//! durations are all over the place. The scanner walks the ring, measures
//! how long each candidate run stays coherent under a jitter tolerance, and
//! keeps a private copy of the longest run seen so far for the decoders.

use tracing::{debug, trace};

use super::ring::{Pulse, PulseRing};
use crate::bits::BitBuffer;

/// Timing classes tracked per candidate run. Two or three duration classes
/// per level cover the line codes we care about.
const SEARCH_CLASSES: usize = 3;

/// Runs shorter than this are ignored: too little data for any protocol
const MIN_RUN_PULSES: usize = 24;

/// Class tolerance divisor: a pulse belongs to a class when its duration is
/// within avg/10 (10%) of the class average, with a floor of 1us so that
/// sub-10us classes never degenerate to exact matching. Captured durations
/// always carry measurement jitter, so equality is never exact.
const CLASS_TOLERANCE_DIV: u32 = 10;

/// Symmetric difference between two pulse durations
pub fn duration_delta(a: u32, b: u32) -> u32 {
    a.abs_diff(b)
}

#[derive(Debug, Clone, Copy, Default)]
struct TimingClass {
    /// Running average duration, per level (0 = low, 1 = high)
    dur: [u32; 2],
    count: [u32; 2],
}

/// Measure how many consecutive pulses starting at `start` stay coherent,
/// and the short-pulse duration of the run (the symbol time unit).
fn coherent_run(pulses: &[Pulse], start: usize) -> (usize, u32) {
    let mut classes = [TimingClass::default(); SEARCH_CLASSES];
    let mut len = 0;

    'pulses: for pulse in &pulses[start..] {
        let lvl = usize::from(pulse.level);
        for class in classes.iter_mut() {
            if class.count[lvl] == 0 {
                class.dur[lvl] = pulse.duration;
                class.count[lvl] = 1;
                len += 1;
                continue 'pulses;
            }
            let avg = class.dur[lvl];
            if duration_delta(pulse.duration, avg) <= (avg / CLASS_TOLERANCE_DIV).max(1) {
                class.dur[lvl] = (avg + pulse.duration) / 2;
                class.count[lvl] += 1;
                len += 1;
                continue 'pulses;
            }
        }
        break; // fits no class: the coherent run ends here
    }

    let short = classes
        .iter()
        .flat_map(|c| [0, 1].map(|lvl| (c.count[lvl], c.dur[lvl])))
        .filter(|&(count, _)| count > 0)
        .map(|(_, dur)| dur)
        .min()
        .unwrap_or(0);

    (len, short)
}

/// A self-contained copy of a coherent pulse run, decoupled from the live
/// ring so decoding never races the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSignal {
    pulses: Vec<Pulse>,
    /// Estimated short-pulse duration in microseconds
    short_pulse_us: u32,
}

impl DetectedSignal {
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn short_pulse_us(&self) -> u32 {
        self.short_pulse_us
    }

    /// Demodulate the run into a symbol bitmap: each pulse contributes
    /// round(duration / short_pulse) bits of its level, bounded by the
    /// buffer capacity.
    pub fn to_symbol_bits(&self, capacity_bytes: usize) -> BitBuffer {
        let mut bits = BitBuffer::new(capacity_bytes);
        let unit = self.short_pulse_us.max(1);
        'pulses: for pulse in &self.pulses {
            let slots = ((pulse.duration + unit / 2) / unit).max(1);
            for _ in 0..slots {
                if bits.push(pulse.level).is_err() {
                    break 'pulses;
                }
            }
        }
        bits
    }
}

/// Incremental scanner over the capture ring.
///
/// Tracks the longest coherent run seen since the last reset
/// (`best_len`) and the absolute pulse index already examined
/// (`last_scan_total`), so repeated scans only look at new pulses.
pub struct SignalScanner {
    best_len: usize,
    last_scan_total: u64,
    detected: Option<DetectedSignal>,
}

impl SignalScanner {
    pub fn new() -> Self {
        Self {
            best_len: 0,
            last_scan_total: 0,
            detected: None,
        }
    }

    /// Longest coherent run seen since the last reset
    pub fn best_len(&self) -> usize {
        self.best_len
    }

    /// The currently isolated signal, if any
    pub fn detected(&self) -> Option<&DetectedSignal> {
        self.detected.as_ref()
    }

    /// Forget the current signal and length tracking. Called when the radio
    /// context (frequency, modulation) changes and old partial signals
    /// become meaningless. Pulses already examined stay examined.
    pub fn reset_current_signal(&mut self) {
        self.best_len = 0;
        self.detected = None;
        debug!("signal state reset");
    }

    /// Scan pulses the previous scan has not covered yet, isolating the
    /// best coherent run. Returns true when a new signal was captured into
    /// the detected buffer. Re-running with no new pulses is a no-op.
    pub fn scan_for_signal(&mut self, ring: &PulseRing) -> bool {
        let (pulses, total) = ring.snapshot();
        if total == self.last_scan_total || pulses.is_empty() {
            return false;
        }

        // Map the absolute resume position into the snapshot window
        let window_start = total - pulses.len() as u64;
        let start = self.last_scan_total.saturating_sub(window_start) as usize;

        let mut found = false;
        for i in start..pulses.len().saturating_sub(1) {
            let (len, short) = coherent_run(&pulses, i);
            if len >= MIN_RUN_PULSES && len >= self.best_len && short > 0 {
                trace!(
                    "coherent run: {} pulses at offset {}, short pulse {}us",
                    len,
                    i,
                    short
                );
                self.best_len = len;
                self.detected = Some(DetectedSignal {
                    pulses: pulses[i..i + len].to_vec(),
                    short_pulse_us: short,
                });
                found = true;
            }
        }

        self.last_scan_total = total;
        if found {
            debug!(
                "signal captured: {} pulses (best so far)",
                self.best_len
            );
        }
        found
    }
}

impl Default for SignalScanner {
    fn default() -> Self {
        Self::new()
    }
}
