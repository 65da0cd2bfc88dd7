//! [`Board`] for an Arduino Nano (ATmega328P).

use core::convert::Infallible;

use super::adc::{self, Adc};
use super::pwm::{self, Pwm};
use super::{gpio, Board, PinMode, PinState};

pub struct NanoBoard {
    adc: Adc,
    pwm: Pwm,
}

impl NanoBoard {
    pub fn new() -> Self {
        Self {
            adc: Adc::new(),
            pwm: Pwm::new(),
        }
    }
}

impl Default for NanoBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for NanoBoard {
    type Error = Infallible;

    fn configure_pin(&mut self, pin: u8, mode: PinMode) {
        gpio::configure(pin, mode);
        if mode == PinMode::Pwm {
            if let Some(channel) = pwm::channel(pin) {
                self.pwm.set_duty(channel, 0);
                self.pwm.enable(channel);
            }
        }
    }

    fn read_digital(&mut self, pin: u8) -> PinState {
        gpio::read(pin)
    }

    fn write_digital(&mut self, pin: u8, state: PinState) {
        gpio::write(pin, state);
    }

    fn read_analog(&mut self, pin: u8) -> nb::Result<u16, Self::Error> {
        match adc::channel(pin) {
            Some(channel) => self.adc.read(channel),
            None => Ok(0),
        }
    }

    fn write_pwm(&mut self, pin: u8, duty: u8) {
        if let Some(channel) = pwm::channel(pin) {
            self.pwm.set_duty(channel, duty);
        }
    }

    fn pin_has_pwm(&self, pin: u8) -> bool {
        pwm::channel(pin).is_some()
    }

    fn is_analog_capable_pin(&self, pin: u8) -> bool {
        adc::channel(pin).is_some()
    }
}
