//! Non-blocking ADC for the ATmega328P.
//!
//! A read starts a conversion on the requested channel and returns
//! `WouldBlock` until ADSC clears. Asking for another channel while a
//! conversion runs waits for that one to finish first.

use avr_device::atmega328p::ADC;
use core::convert::Infallible;

const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
/// clk/128, 125 kHz at 16 MHz
const PRESCALER_128: u8 = 0x07;
/// AVCC reference
const REFS_AVCC: u8 = 0x40;

/// ADC channel behind a Nano pin: A0..A7 are pins 14..21.
pub fn channel(pin: u8) -> Option<u8> {
    match pin {
        14..=21 => Some(pin - 14),
        _ => None,
    }
}

pub struct Adc {
    pending: Option<u8>,
}

impl Adc {
    pub fn new() -> Self {
        unsafe {
            let p = ADC::ptr();
            (*p).adcsra.write(|w| w.bits(ADEN | PRESCALER_128));
            (*p).admux.write(|w| w.bits(REFS_AVCC));
        }
        Self { pending: None }
    }

    fn busy(&self) -> bool {
        unsafe { (*ADC::ptr()).adcsra.read().bits() & ADSC != 0 }
    }

    fn start(&mut self, channel: u8) {
        unsafe {
            let p = ADC::ptr();
            (*p).admux.modify(|r, w| w.bits((r.bits() & 0xF0) | channel));
            (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
        }
        self.pending = Some(channel);
    }

    pub fn read(&mut self, channel: u8) -> nb::Result<u16, Infallible> {
        if self.busy() {
            return Err(nb::Error::WouldBlock);
        }
        match self.pending {
            Some(pending) if pending == channel => {
                self.pending = None;
                Ok(unsafe { (*ADC::ptr()).adc.read().bits() })
            }
            _ => {
                self.start(channel);
                Err(nb::Error::WouldBlock)
            }
        }
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}
