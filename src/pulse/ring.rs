//! Bounded ring of recent pulses
//!
//! The producer (radio worker, or the line reader standing in for it) keeps
//! appending pulses; the scanner periodically takes a snapshot copy under a
//! brief lock and decodes from the copy. That snapshot is the only
//! synchronization point between capture and decoding, so once taken the
//! decode pipeline never races against new incoming pulses.

use std::sync::Mutex;

/// One timed radio level: high or low for `duration` microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub level: bool,
    pub duration: u32,
}

struct Inner {
    buf: Vec<Pulse>,
    /// Pulses ever written; the ring retains the last `capacity` of them
    total: u64,
}

/// Fixed-capacity ring of the most recent pulses
pub struct PulseRing {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl PulseRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                buf: Vec::with_capacity(capacity),
                total: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one pulse, evicting the oldest when full
    pub fn add(&self, pulse: Pulse) {
        let mut inner = self.lock();
        let idx = (inner.total % self.capacity as u64) as usize;
        if inner.buf.len() < self.capacity {
            inner.buf.push(pulse);
        } else {
            inner.buf[idx] = pulse;
        }
        inner.total += 1;
    }

    /// Monotonic count of pulses ever written (the current write index)
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    /// Copy the retained window, oldest first, plus the current write
    /// index. This is the snapshot the scanner decodes from.
    pub fn snapshot(&self) -> (Vec<Pulse>, u64) {
        let inner = self.lock();
        let len = inner.buf.len();
        let mut out = Vec::with_capacity(len);
        if len < self.capacity {
            out.extend_from_slice(&inner.buf);
        } else {
            let head = (inner.total % self.capacity as u64) as usize;
            out.extend_from_slice(&inner.buf[head..]);
            out.extend_from_slice(&inner.buf[..head]);
        }
        (out, inner.total)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // A poisoned ring still holds valid pulses; keep reading it
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(duration: u32) -> Pulse {
        Pulse {
            level: duration % 2 == 0,
            duration,
        }
    }

    #[test]
    fn test_add_and_snapshot_in_order() {
        let ring = PulseRing::new(8);
        for d in 1..=5 {
            ring.add(p(d));
        }
        let (pulses, total) = ring.snapshot();
        assert_eq!(total, 5);
        let durations: Vec<u32> = pulses.iter().map(|p| p.duration).collect();
        assert_eq!(durations, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_wraparound_keeps_most_recent() {
        let ring = PulseRing::new(4);
        for d in 1..=6 {
            ring.add(p(d));
        }
        let (pulses, total) = ring.snapshot();
        assert_eq!(total, 6);
        let durations: Vec<u32> = pulses.iter().map(|p| p.duration).collect();
        assert_eq!(durations, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_total_is_monotonic() {
        let ring = PulseRing::new(2);
        assert_eq!(ring.total(), 0);
        for d in 0..10 {
            ring.add(p(d));
        }
        assert_eq!(ring.total(), 10);
    }
}
