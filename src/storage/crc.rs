//! CRC-16/ANSI (Modbus RTU flavour): reflected polynomial 0xA001,
//! initial value 0xFFFF, bit serial, no table.
//!
//! Appending the CRC low byte first makes the CRC of the whole message
//! zero, which is how a stored region is checked.

pub const CRC_INIT: u16 = 0xFFFF;
const POLY: u16 = 0xA001;

pub fn crc16_update(mut crc: u16, byte: u8) -> u16 {
    crc ^= byte as u16;
    for _ in 0..8 {
        if crc & 0x0001 != 0 {
            crc = (crc >> 1) ^ POLY;
        } else {
            crc >>= 1;
        }
    }
    crc
}

pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(CRC_INIT, |crc, &b| crc16_update(crc, b))
}
