//! Hardware capability interface used by the module core.
//!
//! The core never touches registers itself: it addresses pins by their
//! board number and goes through [`Board`]. On the AVR target the
//! ATmega328P backend implements it; [`sim::SimBoard`] stands in for it on
//! the host.

pub use embedded_hal::digital::v2::PinState;

pub mod sim;

#[cfg(target_arch = "avr")]
pub mod adc;
#[cfg(target_arch = "avr")]
pub mod eeprom;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod nano;
#[cfg(target_arch = "avr")]
pub mod pwm;
#[cfg(target_arch = "avr")]
pub mod uart;

/// Electrical configuration of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    InputPullUp,
    Output,
    Pwm,
}

/// Pin level access for the board the module runs on.
pub trait Board {
    type Error: core::fmt::Debug;

    fn configure_pin(&mut self, pin: u8, mode: PinMode);
    fn read_digital(&mut self, pin: u8) -> PinState;
    fn write_digital(&mut self, pin: u8, state: PinState);

    /// Reads one conversion. Returns `WouldBlock` while the converter is busy.
    fn read_analog(&mut self, pin: u8) -> nb::Result<u16, Self::Error>;

    fn write_pwm(&mut self, pin: u8, duty: u8);
    fn pin_has_pwm(&self, pin: u8) -> bool;

    /// True for pins wired to the analog converter. The module never
    /// drives these as outputs.
    fn is_analog_capable_pin(&self, pin: u8) -> bool;
}

/// Runs `f` with interrupts masked.
///
/// Only the analog filter update needs this: its accumulator may be read
/// from an interrupt handler while the control loop folds in a sample.
#[inline]
pub fn interrupt_free<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(target_arch = "avr")]
    {
        avr_device::interrupt::free(|_| f())
    }
    #[cfg(not(target_arch = "avr"))]
    {
        f()
    }
}
