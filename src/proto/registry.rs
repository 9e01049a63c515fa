//! Decoder dispatch: ordered, first-match-wins

use tracing::debug;

use super::{MessageInfo, ProtocolDecoder};
use crate::bits::BitBuffer;

/// Ordered collection of protocol decoders.
///
/// `decode` hands the isolated signal to each decoder in registration order
/// and returns the first success without invoking the rest. The registry
/// performs no pre-filtering: every decoder owns locating its own sync in
/// the bitmap. Registration order is the caller's responsibility.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn ProtocolDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Append a decoder. Adding a protocol never touches dispatch logic.
    pub fn register(&mut self, decoder: Box<dyn ProtocolDecoder>) {
        self.decoders.push(decoder);
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Try each decoder against the symbol bitmap; first success wins.
    /// `None` means no registered protocol matched.
    pub fn decode(&self, bits: &BitBuffer) -> Option<MessageInfo> {
        for decoder in &self.decoders {
            if let Some(info) = decoder.decode(bits) {
                debug!("decoder '{}' claimed the signal", decoder.name());
                return Some(info);
            }
        }
        None
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDecoder {
        name: &'static str,
        claims: bool,
    }

    impl ProtocolDecoder for FixedDecoder {
        fn name(&self) -> &str {
            self.name
        }

        fn decode(&self, _bits: &BitBuffer) -> Option<MessageInfo> {
            if self.claims {
                let mut info = MessageInfo::default();
                info.set_name(self.name);
                Some(info)
            } else {
                None
            }
        }
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = DecoderRegistry::new();
        registry.register(Box::new(FixedDecoder {
            name: "first",
            claims: false,
        }));
        registry.register(Box::new(FixedDecoder {
            name: "second",
            claims: true,
        }));
        registry.register(Box::new(FixedDecoder {
            name: "third",
            claims: true,
        }));

        let bits = BitBuffer::new(4);
        let info = registry.decode(&bits).unwrap();
        assert_eq!(info.name, "second");
    }

    #[test]
    fn test_no_match() {
        let mut registry = DecoderRegistry::new();
        registry.register(Box::new(FixedDecoder {
            name: "never",
            claims: false,
        }));
        let bits = BitBuffer::new(4);
        assert!(registry.decode(&bits).is_none());
    }

    #[test]
    fn test_decode_does_not_mutate_input() {
        let registry = crate::proto::default_registry();
        let mut bits = BitBuffer::new(64);
        bits.fill_pattern("1001");
        let before = bits.clone();
        let _ = registry.decode(&bits);
        assert_eq!(bits, before);
    }
}
