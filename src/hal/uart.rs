//! USART0 console output, 8N1.

use avr_device::atmega328p::USART0;
use core::convert::Infallible;
use embedded_hal::serial;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const RXEN0: u8 = 1 << 4;
const TXEN0: u8 = 1 << 3;
const UDRE0: u8 = 1 << 5;
const TXC0: u8 = 1 << 6;
/// 8 data bits, no parity, 1 stop bit
const UCSZ_8N1: u8 = 0b11 << 1;

pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();
            (*p).ubrr0.write(|w| w.bits(UBRR));
            (*p).ucsr0a.write(|w| w.bits(0));
            (*p).ucsr0b.write(|w| w.bits(RXEN0 | TXEN0));
            (*p).ucsr0c.write(|w| w.bits(UCSZ_8N1));
        }
        Self { _private: () }
    }

    fn status(&self) -> u8 {
        unsafe { (*USART0::ptr()).ucsr0a.read().bits() }
    }
}

impl Default for Usart0 {
    fn default() -> Self {
        Self::new()
    }
}

impl serial::Write<u8> for Usart0 {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.status() & UDRE0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        unsafe {
            let p = USART0::ptr();
            // clear TXC0 so flush can tell when this byte left the wire
            (*p).ucsr0a.modify(|r, w| w.bits(r.bits() | TXC0));
            (*p).udr0.write(|w| w.bits(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.status() & TXC0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}
