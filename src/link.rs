//! Change report for the link reader.
//!
//! The patch-bay controller polls each module for a fixed size report.
//! Every entry starts with a byte holding a 2-bit tag and the pin index:
//!
//! ```text
//! analog      00iiiiii  value_hi  value_lo
//! digital     01iiiiii  value
//! connection  10iiiiii  c mmmmmmm  pin        (c = connected, m = peer module)
//! end         11111111
//! ```

use heapless::Vec;

use crate::config::MAX_PINS_PER_GROUP;
use crate::module::Module;
use crate::pins::{PinGroup, PinType, Reader};

pub const TAG_ANALOG_VALUE: u8 = 0b0000_0000;
pub const TAG_DIGITAL_VALUE: u8 = 0b0100_0000;
pub const TAG_CONNECTION: u8 = 0b1000_0000;
pub const TAG_END: u8 = 0b1111_1111;
pub const TAG_MASK: u8 = 0b1100_0000;

const INDEX_MASK: u8 = !TAG_MASK;
const MAX_ENTRY: usize = 3;

/// Drains the link reader's changes into `buf` and returns the report
/// length. Changes that do not fit stay pending for the next report; an
/// end marker follows the last entry when there is room for it.
pub fn encode_changes(module: &mut Module, buf: &mut [u8]) -> usize {
    let mut len = 0;

    for pin_type in [PinType::AnalogInput, PinType::DigitalInput, PinType::SocketInput] {
        let Some(group) = module.group_mut(pin_type) else {
            continue;
        };
        let pending: Vec<u8, MAX_PINS_PER_GROUP> = group.pending(Reader::Link).collect();

        for index in pending {
            let mut entry = [0u8; MAX_ENTRY];
            let Some(size) = encode_entry(group, index, &mut entry) else {
                // index too large for the wire format
                group.acknowledge(Reader::Link, index);
                continue;
            };
            if len + size > buf.len() {
                return terminate(buf, len);
            }
            buf[len..len + size].copy_from_slice(&entry[..size]);
            len += size;
            group.acknowledge(Reader::Link, index);
        }
    }

    terminate(buf, len)
}

fn encode_entry(group: &PinGroup, index: u8, entry: &mut [u8; MAX_ENTRY]) -> Option<usize> {
    if index > INDEX_MASK {
        return None;
    }
    let sample = group.get(index)?;

    match group.pin_type() {
        PinType::AnalogInput => {
            let [hi, lo] = sample.value().to_be_bytes();
            *entry = [TAG_ANALOG_VALUE | index, hi, lo];
            Some(3)
        }
        PinType::DigitalInput => {
            entry[0] = TAG_DIGITAL_VALUE | index;
            entry[1] = sample.value() as u8;
            Some(2)
        }
        PinType::SocketInput => {
            let conn = sample.connection();
            let connected = if conn.is_connected { 0x80 } else { 0 };
            *entry = [
                TAG_CONNECTION | index,
                connected | (conn.module_id & 0x7F),
                conn.pin_id,
            ];
            Some(3)
        }
        _ => None,
    }
}

fn terminate(buf: &mut [u8], len: usize) -> usize {
    match buf.get_mut(len) {
        Some(slot) => {
            *slot = TAG_END;
            len + 1
        }
        None => len,
    }
}
