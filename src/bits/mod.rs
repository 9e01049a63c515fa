//! Bit-level primitives for demodulated pulse bitmaps
//!
//! Captured signals are stored as bitmaps of "symbol bits": one bit per
//! short-pulse-duration slot, high level = 1, low level = 0. This module
//! provides:
//! 1. A fixed-capacity, bounds-checked bit buffer over a byte array
//! 2. Exact and sliding-window bit-pattern search (sync detection)
//! 3. Line-code and differential Manchester conversion from symbol bits
//!    to clean data bits

mod buffer;
mod linecode;
mod search;

pub use buffer::{BitBuffer, BufferError};
pub use linecode::{convert_from_diff_manchester, convert_from_line_code};
pub use search::{match_at, seek};
