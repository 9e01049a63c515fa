//! CRC8 checksum validation for decoded payloads

/// Compute a non-reflected, bit-at-a-time CRC8 over `data`.
///
/// The polynomial and initial value vary per protocol, so both are
/// arguments. Decoders use the result strictly as an acceptance gate: a
/// mismatch rejects the message, it is never "corrected".
pub fn crc8(data: &[u8], init: u8, poly: u8) -> u8 {
    let mut crc = init;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ poly;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
