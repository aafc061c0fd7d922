/// Bit-reversed CRC-8 (polynomial 0x8C, seed 0x00) as used by the band firmware.
///
/// Bits are consumed LSB first. The empty sequence yields 0.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0x00;

    for &byte in data {
        let mut extract = byte;
        for _ in 0..8 {
            let sum = (crc ^ extract) & 0x01;
            crc >>= 1;
            if sum != 0 {
                crc ^= 0x8C;
            }
            extract >>= 1;
        }
    }

    crc
}
