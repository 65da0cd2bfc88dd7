//! ATmega328P EEPROM as a configuration [`Store`].

use avr_device::atmega328p::EEPROM;

use super::interrupt_free;
use crate::storage::Store;

pub const EEPROM_SIZE: usize = 1024;

const EERE: u8 = 1 << 0;
const EEPE: u8 = 1 << 1;
const EEMPE: u8 = 1 << 2;

pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn wait_ready(&self) {
        unsafe { while (*EEPROM::ptr()).eecr.read().bits() & EEPE != 0 {} }
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.wait_ready();
        unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(addr));
            (*p).eecr.write(|w| w.bits(EERE));
            (*p).eedr.read().bits()
        }
    }

    /// Programs one byte unless it already holds `value`, saving a wear cycle.
    fn write_byte(&mut self, addr: u16, value: u8) {
        if self.read_byte(addr) == value {
            return;
        }
        self.wait_ready();
        // EEPE must follow EEMPE within four cycles
        interrupt_free(|| unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(addr));
            (*p).eedr.write(|w| w.bits(value));
            (*p).eecr.write(|w| w.bits(EEMPE));
            (*p).eecr.write(|w| w.bits(EEMPE | EEPE));
        });
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for Eeprom {
    fn region_length(&self) -> usize {
        EEPROM_SIZE
    }

    fn read_at(&mut self, offset: usize, buf: &mut [u8]) {
        for (i, slot) in buf.iter_mut().enumerate() {
            let addr = offset + i;
            *slot = if addr < EEPROM_SIZE {
                self.read_byte(addr as u16)
            } else {
                crate::storage::ERASED
            };
        }
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            let addr = offset + i;
            if addr < EEPROM_SIZE {
                self.write_byte(addr as u16, byte);
            }
        }
    }
}
