//! Toyota TPMS decoder
//!
//! Tire pressure sensor, usually 443.92 MHz FSK in Europe. ~48us short
//! pulse. The transmission is an alternating preamble, a sync, and 9 bytes
//! (ID, pressure, temperature, status, CRC) of differentially
//! Manchester-encoded data.
//!
//! The receiver often mangles the leading 101010... preamble, so we do not
//! look for it. The sync is "001111" or "0011111" depending on how the long
//! high pulse got classified, and it is always followed by one encoded data
//! symbol pair ("00" or "01", since the stream starts from a high level),
//! so seeking sync+pair gives a more robust lock. The matched tail pair is
//! then re-consumed as the first data bit.

use tracing::debug;

use super::crc::crc8;
use super::{MessageInfo, ProtocolDecoder};
use crate::bits::{convert_from_diff_manchester, seek, BitBuffer};

/// Sync variants, most common first. The final two bits of each are the
/// first data symbol pair, so the decode offset backs up by two.
const SYNC_PATTERNS: [&str; 4] = ["00111100", "001111100", "00111101", "001111101"];

const PAYLOAD_BYTES: usize = 9;
const PAYLOAD_BITS: usize = PAYLOAD_BYTES * 8;

const CRC_INIT: u8 = 0x80;
const CRC_POLY: u8 = 7;

pub struct ToyotaTpmsDecoder;

impl ProtocolDecoder for ToyotaTpmsDecoder {
    fn name(&self) -> &str {
        "Toyota TPMS"
    }

    fn decode(&self, bits: &BitBuffer) -> Option<MessageInfo> {
        // Each data bit is two symbols in the bitmap
        if bits.len() < PAYLOAD_BITS * 2 {
            return None;
        }

        let (sync, off) = SYNC_PATTERNS.iter().find_map(|sync| {
            seek(bits, 0, bits.len(), sync).map(|pos| (*sync, pos + sync.len() - 2))
        })?;
        debug!("Toyota TPMS sync[{}] found", sync);

        let mut payload = BitBuffer::new(PAYLOAD_BYTES);
        let decoded = convert_from_diff_manchester(&mut payload, bits, off, true);
        debug!("Toyota TPMS decoded bits: {}", decoded);
        if decoded < PAYLOAD_BITS {
            return None;
        }

        let raw = payload.as_bytes();
        if crc8(&raw[..8], CRC_INIT, CRC_POLY) != raw[8] {
            return None;
        }

        let kpa = f32::from((u16::from(raw[4] & 0x7f) << 1) | u16::from(raw[5] >> 7)) * 0.25 - 7.0;
        let temp = i32::from((u16::from(raw[5] & 0x7f) << 1) | u16::from(raw[6] >> 7)) - 40;

        let mut info = MessageInfo::default();
        info.set_name("Toyota TPMS");
        let hex_raw: String = raw.iter().map(|b| format!("{:02X}", b)).collect();
        info.set_raw(&hex_raw);
        info.set_info1(&format!("Pressure {:.2} psi", kpa));
        info.set_info2(&format!("Temperature {} C", temp));
        info.set_info3(&format!(
            "Tire ID {:02X}{:02X}{:02X}{:02X}",
            raw[0], raw[1], raw[2], raw[3]
        ));
        info.len = (off + PAYLOAD_BITS * 2) as u64;
        Some(info)
    }
}
