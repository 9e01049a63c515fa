//! Bit-pattern search over a BitBuffer
//!
//! Protocol syncs are not byte-aligned, so the search slides one bit at a
//! time and tries every starting offset, overlapping matches included.
//! Capture buffers are a few thousand bits, so a plain linear scan is the
//! right tool.

use super::buffer::BitBuffer;

/// Compare `pattern.len()` consecutive bits starting at `pos` against a
/// '0'/'1' pattern string. Returns false, not an error, when the pattern
/// would run past the buffer's valid bits: a truncated tail never matches.
pub fn match_at(buf: &BitBuffer, pos: usize, pattern: &str) -> bool {
    let pat = pattern.as_bytes();
    if pat.is_empty() || pos + pat.len() > buf.len() {
        return false;
    }
    pat.iter()
        .enumerate()
        .all(|(i, &c)| buf.bit(pos + i) == (c == b'1'))
}

/// Scan forward from `start` for the first position where `pattern`
/// matches, bounded by `start + max_bits` and by the buffer's valid bits.
/// Returns `None` when no match occurs in range.
pub fn seek(buf: &BitBuffer, start: usize, max_bits: usize, pattern: &str) -> Option<usize> {
    let end = start.saturating_add(max_bits).min(buf.len());
    (start..end).find(|&pos| match_at(buf, pos, pattern))
}
