/// The checksum polynomial shared by all SGP3x devices: x^8 + x^5 + x^4 + 1.
const POLYNOMIAL: u8 = 0x31;
/// Initial register value per the datasheet.
const INITIAL: u8 = 0xFF;

/// Computes the CRC-8 checksum the SGP30 appends after every 16-bit word on
/// the wire.
///
/// MSB-first, non-reflected, no final XOR. The device computes the same
/// checksum over the two data bytes of each word, so host and device values
/// must agree bit-for-bit. On this protocol the input is always exactly two
/// bytes, but the routine accepts any length.
pub fn hash(data: &[u8]) -> u8 {
    let mut crc = INITIAL;
    for byte in data {
        let mut byte = *byte;
        for _ in 0..8 {
            if (byte ^ crc) & 0x80 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
            byte <<= 1;
        }
    }
    crc
}
