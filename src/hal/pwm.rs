//! Hardware PWM on the six ATmega328P compare outputs.
//!
//! All three timers run 8-bit fast PWM at clk/64, about 980 Hz at 16 MHz.

use avr_device::atmega328p::{TC0, TC1, TC2};

/// Compare output behind a PWM capable Nano pin
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PwmChannel {
    Timer0A,
    Timer0B,
    Timer1A,
    Timer1B,
    Timer2A,
    Timer2B,
}

pub fn channel(pin: u8) -> Option<PwmChannel> {
    match pin {
        6 => Some(PwmChannel::Timer0A),
        5 => Some(PwmChannel::Timer0B),
        9 => Some(PwmChannel::Timer1A),
        10 => Some(PwmChannel::Timer1B),
        11 => Some(PwmChannel::Timer2A),
        3 => Some(PwmChannel::Timer2B),
        _ => None,
    }
}

// WGM bits for 8-bit fast PWM
const TC0_WGM_FAST: u8 = 0b11;
const TC1_WGM_FAST8_A: u8 = 0b01;
const TC1_WGM_FAST8_B: u8 = 0b01 << 3;
const TC2_WGM_FAST: u8 = 0b11;

const TC0_CLK_64: u8 = 0b011;
const TC1_CLK_64: u8 = 0b011;
const TC2_CLK_64: u8 = 0b100;

// non-inverting compare output mode
const COM_A: u8 = 0b10 << 6;
const COM_B: u8 = 0b10 << 4;

pub struct Pwm {
    _private: (),
}

impl Pwm {
    /// Starts the three timers with every compare output disconnected.
    pub fn new() -> Self {
        unsafe {
            (*TC0::ptr()).tccr0a.write(|w| w.bits(TC0_WGM_FAST));
            (*TC0::ptr()).tccr0b.write(|w| w.bits(TC0_CLK_64));

            (*TC1::ptr()).tccr1a.write(|w| w.bits(TC1_WGM_FAST8_A));
            (*TC1::ptr()).tccr1b.write(|w| w.bits(TC1_WGM_FAST8_B | TC1_CLK_64));

            (*TC2::ptr()).tccr2a.write(|w| w.bits(TC2_WGM_FAST));
            (*TC2::ptr()).tccr2b.write(|w| w.bits(TC2_CLK_64));
        }
        Self { _private: () }
    }

    /// Connects the compare output to its pin.
    pub fn enable(&mut self, channel: PwmChannel) {
        unsafe {
            match channel {
                PwmChannel::Timer0A => (*TC0::ptr()).tccr0a.modify(|r, w| w.bits(r.bits() | COM_A)),
                PwmChannel::Timer0B => (*TC0::ptr()).tccr0a.modify(|r, w| w.bits(r.bits() | COM_B)),
                PwmChannel::Timer1A => (*TC1::ptr()).tccr1a.modify(|r, w| w.bits(r.bits() | COM_A)),
                PwmChannel::Timer1B => (*TC1::ptr()).tccr1a.modify(|r, w| w.bits(r.bits() | COM_B)),
                PwmChannel::Timer2A => (*TC2::ptr()).tccr2a.modify(|r, w| w.bits(r.bits() | COM_A)),
                PwmChannel::Timer2B => (*TC2::ptr()).tccr2a.modify(|r, w| w.bits(r.bits() | COM_B)),
            }
        }
    }

    pub fn set_duty(&mut self, channel: PwmChannel, duty: u8) {
        unsafe {
            match channel {
                PwmChannel::Timer0A => (*TC0::ptr()).ocr0a.write(|w| w.bits(duty)),
                PwmChannel::Timer0B => (*TC0::ptr()).ocr0b.write(|w| w.bits(duty)),
                PwmChannel::Timer1A => (*TC1::ptr()).ocr1a.write(|w| w.bits(duty as u16)),
                PwmChannel::Timer1B => (*TC1::ptr()).ocr1b.write(|w| w.bits(duty as u16)),
                PwmChannel::Timer2A => (*TC2::ptr()).ocr2a.write(|w| w.bits(duty)),
                PwmChannel::Timer2B => (*TC2::ptr()).ocr2b.write(|w| w.bits(duty)),
            }
        }
    }
}

impl Default for Pwm {
    fn default() -> Self {
        Self::new()
    }
}
