//! Line-code conversion: symbol bits to data bits
//!
//! After demodulation a signal is a bitmap of symbol bits, one per
//! short-pulse slot. Protocols encode each logical data bit as a small run
//! of symbol bits. Two schemes cover the protocols handled here:
//!
//! - Template line codes (RZ/NRZ variants): a logical 0 and a logical 1
//!   each map to a fixed symbol-bit pattern supplied by the protocol
//!   decoder as data, so the conversion itself is protocol-agnostic.
//! - Differential Manchester: each data bit is a symbol pair; there must
//!   be a transition at every bit boundary (the clock), and the value is
//!   carried by the presence or absence of a mid-bit transition, relative
//!   to the previous line level.

use super::buffer::BitBuffer;
use super::search::match_at;

/// Decode a template line code from `src` starting at `offset` into `out`.
///
/// At each step the zero template is tried first, then the one template;
/// whichever matches emits its bit and advances the offset by its own
/// length. Decoding stops at the first offset where neither template
/// matches, or when `out` is full. Returns the number of bits decoded.
pub fn convert_from_line_code(
    out: &mut BitBuffer,
    src: &BitBuffer,
    offset: usize,
    zero_pattern: &str,
    one_pattern: &str,
) -> usize {
    if zero_pattern.is_empty() || one_pattern.is_empty() {
        return 0;
    }
    let mut off = offset;
    let mut decoded = 0;
    loop {
        let (val, adv) = if match_at(src, off, zero_pattern) {
            (false, zero_pattern.len())
        } else if match_at(src, off, one_pattern) {
            (true, one_pattern.len())
        } else {
            break;
        };
        if out.push(val).is_err() {
            break;
        }
        off += adv;
        decoded += 1;
    }
    decoded
}

/// Decode differential Manchester from `src` starting at `off` into `out`.
///
/// `previous` is the line level of the half-bit preceding the stream. Each
/// data bit consumes the symbol pair (b0, b1): b0 must differ from the
/// previous level (clock transition at the bit boundary; a missing
/// transition ends the decode), the decoded value is 1 when b0 == b1 (no
/// mid-bit transition) and 0 otherwise, and b1 becomes the new previous
/// level. Stops when fewer than two symbol bits remain or `out` is full.
/// Returns the number of bits decoded.
pub fn convert_from_diff_manchester(
    out: &mut BitBuffer,
    src: &BitBuffer,
    off: usize,
    previous: bool,
) -> usize {
    let mut off = off;
    let mut prev = previous;
    let mut decoded = 0;
    while off + 1 < src.len() {
        let b0 = src.bit(off);
        let b1 = src.bit(off + 1);
        if b0 == prev {
            break;
        }
        if out.push(b0 == b1).is_err() {
            break;
        }
        prev = b1;
        off += 2;
        decoded += 1;
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_bits(buf: &mut BitBuffer, bits: &str) {
        for c in bits.bytes() {
            buf.push(c == b'1').unwrap();
        }
    }

    /// Encode data bits with the given templates (test-side inverse of
    /// convert_from_line_code)
    fn encode_line_code(bits: &[bool], zero: &str, one: &str) -> BitBuffer {
        let symbols: usize = bits
            .iter()
            .map(|&b| if b { one.len() } else { zero.len() })
            .sum();
        let mut buf = BitBuffer::new(symbols.div_ceil(8));
        for &b in bits {
            push_bits(&mut buf, if b { one } else { zero });
        }
        buf
    }

    /// Encode data bits as differential Manchester (test-side inverse of
    /// convert_from_diff_manchester)
    fn encode_diff_manchester(bits: &[bool], previous: bool) -> BitBuffer {
        let mut buf = BitBuffer::new((bits.len() * 2).div_ceil(8));
        let mut prev = previous;
        for &bit in bits {
            let b0 = !prev;
            let b1 = if bit { b0 } else { !b0 };
            buf.push(b0).unwrap();
            buf.push(b1).unwrap();
            prev = b1;
        }
        buf
    }

    #[test]
    fn test_line_code_roundtrip() {
        let bits = [true, false, false, true, true, false, true];
        let src = encode_line_code(&bits, "10", "1100");
        let mut out = BitBuffer::new(2);
        let decoded = convert_from_line_code(&mut out, &src, 0, "10", "1100");
        assert_eq!(decoded, bits.len());
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(out.get(i).unwrap(), b, "bit {}", i);
        }
    }

    #[test]
    fn test_line_code_stops_on_garbage() {
        let mut src = BitBuffer::new(4);
        // Two valid zero symbols, then a run matching neither template
        push_bits(&mut src, "10");
        push_bits(&mut src, "10");
        push_bits(&mut src, "0000000");
        let mut out = BitBuffer::new(2);
        let decoded = convert_from_line_code(&mut out, &src, 0, "10", "1100");
        assert_eq!(decoded, 2);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_line_code_stops_when_output_full() {
        let bits = vec![false; 20];
        let src = encode_line_code(&bits, "10", "1100");
        let mut out = BitBuffer::new(1);
        let decoded = convert_from_line_code(&mut out, &src, 0, "10", "1100");
        assert_eq!(decoded, 8);
    }

    #[test]
    fn test_diff_manchester_roundtrip() {
        for previous in [false, true] {
            let bits = [true, true, false, true, false, false, true, false];
            let src = encode_diff_manchester(&bits, previous);
            let mut out = BitBuffer::new(1);
            let decoded = convert_from_diff_manchester(&mut out, &src, 0, previous);
            assert_eq!(decoded, bits.len());
            for (i, &b) in bits.iter().enumerate() {
                assert_eq!(out.get(i).unwrap(), b, "previous={} bit {}", previous, i);
            }
        }
    }

    #[test]
    fn test_diff_manchester_is_idempotent() {
        let bits = [true, false, true, true, false];
        let src = encode_diff_manchester(&bits, true);
        let mut out1 = BitBuffer::new(1);
        let mut out2 = BitBuffer::new(1);
        let d1 = convert_from_diff_manchester(&mut out1, &src, 0, true);
        let d2 = convert_from_diff_manchester(&mut out2, &src, 0, true);
        assert_eq!(d1, d2);
        assert_eq!(out1, out2);
    }

    #[test]
    fn test_diff_manchester_stops_on_missing_clock_transition() {
        let mut src = BitBuffer::new(2);
        // previous = false, so a valid stream starts with b0 = 1
        push_bits(&mut src, "10"); // bit 0, level now 0
        push_bits(&mut src, "11"); // bit 1, level now 1
        push_bits(&mut src, "11"); // b0 == previous: invalid
        let mut out = BitBuffer::new(1);
        let decoded = convert_from_diff_manchester(&mut out, &src, 0, false);
        assert_eq!(decoded, 2);
    }

    #[test]
    fn test_diff_manchester_stops_on_odd_tail() {
        let mut src = BitBuffer::new(1);
        push_bits(&mut src, "10"); // one full pair
        push_bits(&mut src, "1"); // dangling half bit
        let mut out = BitBuffer::new(1);
        let decoded = convert_from_diff_manchester(&mut out, &src, 0, false);
        assert_eq!(decoded, 1);
    }

    #[test]
    fn test_diff_manchester_stops_when_output_full() {
        let bits = vec![true; 12];
        let src = encode_diff_manchester(&bits, true);
        let mut out = BitBuffer::new(1);
        let decoded = convert_from_diff_manchester(&mut out, &src, 0, true);
        assert_eq!(decoded, 8);
    }
}
