//! Sampling, debounce and filtering of one physical pin, plus its end of
//! the socket discovery protocol.

use crate::config::{ANALOG_THRESHOLD, DEBOUNCE_DELAY, FILTER_SHIFT, MAX_FILTER_SHIFT};
use crate::error::PinFault;
use crate::hal::{interrupt_free, Board, PinMode, PinState};

use super::{Connection, PinType};

/// Identity word received when nothing drives a pulled-up socket input
const NO_PEER: u16 = 0xFFFF;
const LAST_BIT: u8 = 15;

/// Runtime tunables of the samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    pub debounce_delay: u8,
    pub filter_shift: u8,
    pub analog_threshold: u16,
}

impl SamplingConfig {
    pub fn with_filter_shift(mut self, shift: u8) -> Self {
        self.filter_shift = shift.min(MAX_FILTER_SHIFT);
        self
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            debounce_delay: DEBOUNCE_DELAY,
            filter_shift: FILTER_SHIFT,
            analog_threshold: ANALOG_THRESHOLD,
        }
    }
}

/// Receive side state of a socket pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SocketLink {
    serial_buffer: u16,
    prev_serial_buffer: u16,
    confirmed_id: u16,
    is_connected: bool,
}

impl SocketLink {
    const fn new() -> Self {
        Self {
            serial_buffer: NO_PEER,
            prev_serial_buffer: NO_PEER,
            confirmed_id: NO_PEER,
            is_connected: false,
        }
    }

    /// Runs once a full word has been received. Returns true on a
    /// connection or disconnection.
    fn word_complete(&mut self) -> bool {
        // Two consecutive windows must agree, a mismatch is a glitch while
        // a cable is being plugged or pulled
        if self.serial_buffer != self.prev_serial_buffer {
            self.prev_serial_buffer = self.serial_buffer;
            return false;
        }

        if self.is_connected && self.serial_buffer == NO_PEER {
            self.is_connected = false;
            true
        } else if !self.is_connected && self.serial_buffer != NO_PEER {
            self.confirmed_id = self.serial_buffer;
            self.is_connected = true;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSample {
    pin_type: PinType,
    pin: u8,
    index: u8,
    configured: bool,
    /// Analog inputs keep the unshifted filter accumulator here
    current: u16,
    previous: u16,
    shift: u8,
    debounce: u8,
    link: SocketLink,
}

impl PinSample {
    /// Creates an inert sample; nothing touches the hardware until `init`.
    pub fn new(pin_type: PinType, pin: u8, index: u8) -> Self {
        Self {
            pin_type,
            pin,
            index,
            configured: false,
            current: 0,
            previous: 0,
            shift: 0,
            debounce: 0,
            link: SocketLink::new(),
        }
    }

    /// Sets the pin direction and seeds the value from one sample.
    ///
    /// On a capability mismatch the pin is left unconfigured: it reads 0,
    /// never reports a change and ignores writes.
    pub fn init<B: Board>(&mut self, board: &mut B, config: &SamplingConfig) -> Result<(), PinFault> {
        match self.pin_type {
            PinType::DigitalInput | PinType::SocketInput => {
                board.configure_pin(self.pin, PinMode::InputPullUp);
                self.current = read_level(board, self.pin);
            }
            PinType::DigitalOutput | PinType::SocketOutput => {
                if board.is_analog_capable_pin(self.pin) {
                    return Err(PinFault::AnalogOnlyOutput(self.pin));
                }
                board.configure_pin(self.pin, PinMode::Output);
                board.write_digital(self.pin, PinState::Low);
                self.current = 0;
            }
            PinType::AnalogInput => {
                self.shift = config.filter_shift.min(MAX_FILTER_SHIFT);
                self.current = nb::block!(board.read_analog(self.pin)).unwrap_or(0) << self.shift;
            }
            PinType::PwmOutput => {
                if !board.pin_has_pwm(self.pin) {
                    return Err(PinFault::NoPwm(self.pin));
                }
                board.configure_pin(self.pin, PinMode::Pwm);
                board.write_pwm(self.pin, 0);
                self.current = 0;
            }
            PinType::Undefined => return Ok(()),
        }

        self.previous = self.current;
        self.configured = true;
        Ok(())
    }

    /// Samples the pin. Returns true when a change is to be reported.
    pub fn update<B: Board>(&mut self, board: &mut B, config: &SamplingConfig) -> bool {
        if !self.configured {
            return false;
        }

        match self.pin_type {
            PinType::DigitalInput => {
                // the reported level holds until the counter runs out
                if self.debounce > 0 {
                    self.debounce -= 1;
                    return false;
                }
                self.current = read_level(board, self.pin);
                if self.current != self.previous {
                    self.previous = self.current;
                    self.debounce = config.debounce_delay;
                    return true;
                }
                false
            }
            PinType::AnalogInput => {
                let Ok(raw) = nb::block!(board.read_analog(self.pin)) else {
                    return false;
                };
                let shift = self.shift;
                let current = &mut self.current;
                let filtered = interrupt_free(|| {
                    *current = (*current - (*current >> shift)).saturating_add(raw);
                    *current
                });
                if filtered.abs_diff(self.previous) > config.analog_threshold {
                    self.previous = filtered;
                    return true;
                }
                false
            }
            // Readback of the driven level, never a change
            PinType::DigitalOutput | PinType::SocketOutput | PinType::SocketInput => {
                self.current = read_level(board, self.pin);
                false
            }
            PinType::PwmOutput | PinType::Undefined => false,
        }
    }

    /// Drives output pins; inputs ignore it.
    pub fn set_value<B: Board>(&mut self, board: &mut B, value: u16) {
        if !self.configured {
            return;
        }
        match self.pin_type {
            PinType::DigitalOutput | PinType::SocketOutput => {
                board.write_digital(self.pin, PinState::from(value != 0));
            }
            PinType::PwmOutput => {
                let duty = value.min(u8::MAX as u16) as u8;
                self.current = duty as u16;
                board.write_pwm(self.pin, duty);
            }
            _ => {}
        }
    }

    pub fn value(&self) -> u16 {
        match self.pin_type {
            PinType::AnalogInput => self.current >> self.shift,
            _ => self.current,
        }
    }

    /// Sends bit `bit` of this pin's identity word on a socket output.
    pub fn serial_out<B: Board>(&mut self, board: &mut B, bit: u8, module_id: u8) {
        if !self.configured || self.pin_type != PinType::SocketOutput || bit > LAST_BIT {
            return;
        }
        if bit == 0 {
            self.link.serial_buffer = ((module_id as u16) << 8) | self.index as u16;
        }
        let level = (self.link.serial_buffer >> bit) & 1 != 0;
        board.write_digital(self.pin, PinState::from(level));
    }

    /// Receives bit `bit` on a socket input. Returns true when the last bit
    /// completes a word that connects or disconnects the socket.
    pub fn serial_in<B: Board>(&mut self, board: &mut B, bit: u8) -> bool {
        if !self.configured || self.pin_type != PinType::SocketInput || bit > LAST_BIT {
            return false;
        }
        if bit == 0 {
            self.link.serial_buffer = 0;
        }
        self.link.serial_buffer |= read_level(board, self.pin) << bit;

        if bit != LAST_BIT {
            return false;
        }
        self.link.word_complete()
    }

    pub fn connection(&self) -> Connection {
        Connection::from_word(self.link.confirmed_id, self.link.is_connected)
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn pin_type(&self) -> PinType {
        self.pin_type
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

fn read_level<B: Board>(board: &mut B, pin: u8) -> u16 {
    (board.read_digital(pin) == PinState::High) as u16
}
