//! Fixed-capacity, bit-addressable buffer
//!
//! All signal and payload data flows through `BitBuffer`: the scanner writes
//! demodulated symbol bits into one, and the line-code converters write
//! decoded data bits into another. Capacity is fixed at construction and
//! every access is bounds-checked; an index bug must surface as an error,
//! not as silent corruption.

use thiserror::Error;

/// Bit buffer access errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("bit position {pos} out of bounds (capacity {capacity_bits} bits)")]
    OutOfBounds { pos: usize, capacity_bits: usize },
}

/// Fixed-capacity bit buffer backed by a byte array.
///
/// Bits are addressed MSB-first: bit 0 of the buffer is bit 7 of byte 0,
/// so the first 8 bits written form byte 0 as read off the wire. The buffer
/// tracks `len`, the number of valid bits, separately from its capacity;
/// bounds checks for raw access are against capacity, while pattern search
/// and the converters respect `len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    numbits: usize,
}

impl BitBuffer {
    /// Create a zeroed buffer with a fixed capacity in bytes
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity_bytes],
            numbits: 0,
        }
    }

    /// Create a buffer holding a copy of `bytes`, with all bits valid
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            numbits: bytes.len() * 8,
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn capacity_bits(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Number of valid bits
    pub fn len(&self) -> usize {
        self.numbits
    }

    pub fn is_empty(&self) -> bool {
        self.numbits == 0
    }

    /// Set the number of valid bits
    pub fn set_len(&mut self, numbits: usize) -> Result<(), BufferError> {
        if numbits > self.capacity_bits() {
            return Err(BufferError::OutOfBounds {
                pos: numbits,
                capacity_bits: self.capacity_bits(),
            });
        }
        self.numbits = numbits;
        Ok(())
    }

    /// Read the bit at `pos`
    pub fn get(&self, pos: usize) -> Result<bool, BufferError> {
        self.check(pos)?;
        Ok(self.bit(pos))
    }

    /// Write the bit at `pos`
    pub fn set(&mut self, pos: usize, val: bool) -> Result<(), BufferError> {
        self.check(pos)?;
        let byte = pos / 8;
        let mask = 1u8 << (7 - (pos % 8));
        if val {
            self.bytes[byte] |= mask;
        } else {
            self.bytes[byte] &= !mask;
        }
        Ok(())
    }

    /// Append a bit at the current length, growing `len` by one.
    /// Fails with `OutOfBounds` once the buffer is full.
    pub fn push(&mut self, val: bool) -> Result<(), BufferError> {
        let pos = self.numbits;
        self.set(pos, val)?;
        self.numbits = pos + 1;
        Ok(())
    }

    /// Fill the whole buffer with repeating copies of a '0'/'1' pattern
    /// string, starting at bit 0 and truncating the final copy at capacity.
    /// Marks every bit valid. Any character other than '1' writes a 0.
    pub fn fill_pattern(&mut self, pattern: &str) {
        let pat = pattern.as_bytes();
        if pat.is_empty() {
            return;
        }
        let capacity = self.capacity_bits();
        for pos in 0..capacity {
            let val = pat[pos % pat.len()] == b'1';
            let byte = pos / 8;
            let mask = 1u8 << (7 - (pos % 8));
            if val {
                self.bytes[byte] |= mask;
            } else {
                self.bytes[byte] &= !mask;
            }
        }
        self.numbits = capacity;
    }

    /// Reverse the byte order in place. Some protocols are captured with
    /// reversed byte significance and need this before field extraction.
    pub fn reverse_bytes(&mut self) {
        self.bytes.reverse();
    }

    /// Zero the buffer and mark no bits valid
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.numbits = 0;
    }

    /// Raw backing bytes (decoded payloads are read out of these)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check(&self, pos: usize) -> Result<(), BufferError> {
        if pos >= self.capacity_bits() {
            return Err(BufferError::OutOfBounds {
                pos,
                capacity_bits: self.capacity_bits(),
            });
        }
        Ok(())
    }

    /// Unchecked read for callers that have already validated `pos`
    pub(crate) fn bit(&self, pos: usize) -> bool {
        self.bytes[pos / 8] & (1 << (7 - (pos % 8))) != 0
    }
}
