//! Raw port access for the ATmega328P, addressed by Arduino Nano pin number.
//!
//! D0..D7 live on PORTD, D8..D13 on PORTB and A0..A5 (14..19) on PORTC.
//! A6 and A7 (20, 21) have no port bit; they are analog only.

use avr_device::atmega328p::{PORTB, PORTC, PORTD};

use super::{PinMode, PinState};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Port {
    B,
    C,
    D,
}

/// Port and bit behind a Nano pin, `None` for analog-only or absent pins.
pub fn locate(pin: u8) -> Option<(Port, u8)> {
    match pin {
        0..=7 => Some((Port::D, pin)),
        8..=13 => Some((Port::B, pin - 8)),
        14..=19 => Some((Port::C, pin - 14)),
        _ => None,
    }
}

macro_rules! port_ops {
    ($PORT:ident, $ddr:ident, $port:ident, $pin:ident,
     $set_dir:ident, $set_out:ident, $read_in:ident) => {
        fn $set_dir(bit: u8, output: bool) {
            unsafe {
                (*$PORT::ptr()).$ddr.modify(|r, w| {
                    if output {
                        w.bits(r.bits() | (1 << bit))
                    } else {
                        w.bits(r.bits() & !(1 << bit))
                    }
                });
            }
        }

        fn $set_out(bit: u8, high: bool) {
            unsafe {
                (*$PORT::ptr()).$port.modify(|r, w| {
                    if high {
                        w.bits(r.bits() | (1 << bit))
                    } else {
                        w.bits(r.bits() & !(1 << bit))
                    }
                });
            }
        }

        fn $read_in(bit: u8) -> bool {
            unsafe { (*$PORT::ptr()).$pin.read().bits() & (1 << bit) != 0 }
        }
    };
}

port_ops!(PORTB, ddrb, portb, pinb, dir_b, out_b, in_b);
port_ops!(PORTC, ddrc, portc, pinc, dir_c, out_c, in_c);
port_ops!(PORTD, ddrd, portd, pind, dir_d, out_d, in_d);

fn set_direction(port: Port, bit: u8, output: bool) {
    match port {
        Port::B => dir_b(bit, output),
        Port::C => dir_c(bit, output),
        Port::D => dir_d(bit, output),
    }
}

fn set_output(port: Port, bit: u8, high: bool) {
    match port {
        Port::B => out_b(bit, high),
        Port::C => out_c(bit, high),
        Port::D => out_d(bit, high),
    }
}

fn read_input(port: Port, bit: u8) -> bool {
    match port {
        Port::B => in_b(bit),
        Port::C => in_c(bit),
        Port::D => in_d(bit),
    }
}

/// Applies `mode` to the port bit. PWM pins are plain outputs here; the
/// timer takes over the pin once its compare output is enabled.
pub fn configure(pin: u8, mode: PinMode) {
    let Some((port, bit)) = locate(pin) else {
        return;
    };
    match mode {
        PinMode::InputPullUp => {
            set_direction(port, bit, false);
            set_output(port, bit, true);
        }
        PinMode::Output | PinMode::Pwm => {
            set_output(port, bit, false);
            set_direction(port, bit, true);
        }
    }
}

pub fn read(pin: u8) -> PinState {
    match locate(pin) {
        Some((port, bit)) => PinState::from(read_input(port, bit)),
        None => PinState::Low,
    }
}

pub fn write(pin: u8, state: PinState) {
    if let Some((port, bit)) = locate(pin) {
        set_output(port, bit, state == PinState::High);
    }
}
