//! Protocol decoding module
//!
//! Each supported radio protocol is a value implementing [`ProtocolDecoder`]:
//! given a read-only bitmap of demodulated symbol bits, it locates its own
//! sync, converts the payload region to data bits, validates the checksum,
//! and on success returns a fully populated [`MessageInfo`]. The
//! [`DecoderRegistry`] tries decoders in registration order and stops at the
//! first success.

pub mod crc;
mod registry;
mod toyota;

pub use registry::DecoderRegistry;
pub use toyota::ToyotaTpmsDecoder;

use crate::bits::BitBuffer;

/// Maximum length, in characters, of each MessageInfo text field
pub const MSG_STR_LEN: usize = 32;

/// Decoded-message record shown to the user.
///
/// Text fields are bounded at [`MSG_STR_LEN`] characters; the setters
/// truncate, never overflow. A decoder that fails returns `None` from
/// `decode` and publishes no record at all; there is no partially trusted
/// state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInfo {
    /// Protocol name and version
    pub name: String,
    /// Protocol specific raw representation (canonical uppercase hex)
    pub raw: String,
    /// Up to four human-readable info lines, decoder's choice
    pub info1: String,
    pub info2: String,
    pub info3: String,
    pub info4: String,
    /// Bits consumed from the source buffer
    pub len: u64,
}

impl MessageInfo {
    pub fn set_name(&mut self, s: &str) {
        self.name = bounded(s);
    }

    pub fn set_raw(&mut self, s: &str) {
        self.raw = bounded(s);
    }

    pub fn set_info1(&mut self, s: &str) {
        self.info1 = bounded(s);
    }

    pub fn set_info2(&mut self, s: &str) {
        self.info2 = bounded(s);
    }

    pub fn set_info3(&mut self, s: &str) {
        self.info3 = bounded(s);
    }

    pub fn set_info4(&mut self, s: &str) {
        self.info4 = bounded(s);
    }
}

/// Truncate to MSG_STR_LEN characters (on a char boundary)
fn bounded(s: &str) -> String {
    s.chars().take(MSG_STR_LEN).collect()
}

/// One protocol decoder: a named, stateless decode capability.
///
/// `bits` is the demodulated symbol bitmap with `bits.len()` valid bits.
/// Decoders never mutate their input; a decoder that cannot claim the
/// signal (no sync, incomplete payload, bad checksum) returns `None`.
pub trait ProtocolDecoder: Send + Sync {
    /// Display name of the protocol
    fn name(&self) -> &str;

    /// Attempt to decode a message out of the symbol bitmap
    fn decode(&self, bits: &BitBuffer) -> Option<MessageInfo>;
}

/// Registry with every built-in protocol, in dispatch order.
///
/// Decoders with longer, more specific syncs belong earlier in the list.
pub fn default_registry() -> DecoderRegistry {
    let mut registry = DecoderRegistry::new();
    registry.register(Box::new(ToyotaTpmsDecoder));
    registry
}
