//! Host side simulation of an Arduino Nano class board.
//!
//! Pins 0..=13 are digital, 14..=21 analog (A0..A7) like on the real
//! board. Wires join an output pin to an input pin, which is how two
//! modules' sockets are patched together in tests.

use core::convert::Infallible;

use heapless::Vec;

use super::{Board, PinMode, PinState};

pub const SIM_PINS: usize = 32;
const FIRST_ANALOG_PIN: u8 = 14;
const MAX_WIRES: usize = 16;
const PWM_PINS: [u8; 6] = [3, 5, 6, 9, 10, 11];

#[derive(Debug, Clone)]
pub struct SimBoard {
    modes: [Option<PinMode>; SIM_PINS],
    levels: [PinState; SIM_PINS],
    forced: [Option<PinState>; SIM_PINS],
    analog: [u16; SIM_PINS],
    pwm: [u8; SIM_PINS],
    wires: Vec<(u8, u8), MAX_WIRES>,
    adc_latency: u8,
    adc_pending: u8,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            modes: [None; SIM_PINS],
            levels: [PinState::Low; SIM_PINS],
            forced: [None; SIM_PINS],
            analog: [0; SIM_PINS],
            pwm: [0; SIM_PINS],
            wires: Vec::new(),
            adc_latency: 0,
            adc_pending: 0,
        }
    }

    /// Patches output pin `from` to input pin `to`. Returns false when the
    /// wire table is full.
    pub fn connect(&mut self, from: u8, to: u8) -> bool {
        self.wires.push((from, to)).is_ok()
    }

    pub fn disconnect(&mut self, from: u8, to: u8) {
        self.wires.retain(|&wire| wire != (from, to));
    }

    /// Drives a pin from outside the board, overriding wires and pull-ups.
    /// `None` releases it.
    pub fn force(&mut self, pin: u8, state: Option<PinState>) {
        if let Some(slot) = self.forced.get_mut(pin as usize) {
            *slot = state;
        }
    }

    pub fn set_analog(&mut self, pin: u8, value: u16) {
        if let Some(slot) = self.analog.get_mut(pin as usize) {
            *slot = value;
        }
    }

    /// Number of `WouldBlock` polls before each conversion completes.
    pub fn set_adc_latency(&mut self, polls: u8) {
        self.adc_latency = polls;
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.modes.get(pin as usize).copied().flatten()
    }

    pub fn level(&self, pin: u8) -> PinState {
        self.levels.get(pin as usize).copied().unwrap_or(PinState::Low)
    }

    pub fn pwm(&self, pin: u8) -> u8 {
        self.pwm.get(pin as usize).copied().unwrap_or(0)
    }

    fn driven_by_wire(&self, pin: u8) -> Option<PinState> {
        self.wires
            .iter()
            .find(|&&(_, to)| to == pin)
            .and_then(|&(from, _)| match self.mode(from) {
                Some(PinMode::Output) => Some(self.level(from)),
                _ => None,
            })
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for SimBoard {
    type Error = Infallible;

    fn configure_pin(&mut self, pin: u8, mode: PinMode) {
        if let Some(slot) = self.modes.get_mut(pin as usize) {
            *slot = Some(mode);
        }
    }

    fn read_digital(&mut self, pin: u8) -> PinState {
        if let Some(state) = self.forced.get(pin as usize).copied().flatten() {
            return state;
        }
        if let Some(state) = self.driven_by_wire(pin) {
            return state;
        }
        match self.mode(pin) {
            Some(PinMode::InputPullUp) => PinState::High,
            _ => self.level(pin),
        }
    }

    fn write_digital(&mut self, pin: u8, state: PinState) {
        if let Some(slot) = self.levels.get_mut(pin as usize) {
            *slot = state;
        }
    }

    fn read_analog(&mut self, pin: u8) -> nb::Result<u16, Self::Error> {
        if self.adc_pending < self.adc_latency {
            self.adc_pending += 1;
            return Err(nb::Error::WouldBlock);
        }
        self.adc_pending = 0;
        Ok(self.analog.get(pin as usize).copied().unwrap_or(0))
    }

    fn write_pwm(&mut self, pin: u8, duty: u8) {
        if let Some(slot) = self.pwm.get_mut(pin as usize) {
            *slot = duty;
        }
    }

    fn pin_has_pwm(&self, pin: u8) -> bool {
        PWM_PINS.contains(&pin)
    }

    fn is_analog_capable_pin(&self, pin: u8) -> bool {
        pin >= FIRST_ANALOG_PIN
    }
}
