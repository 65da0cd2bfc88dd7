//! Error types reported by the module core
//!
//! Nothing here is fatal: every failure is handed back to the caller and
//! leaves the previous valid state in place.

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

/// Rejected configuration request. Module state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidModuleId(u8),
    UndefinedPinType,
    UnknownPinType(u8),
    MalformedPinList,
    TooManyPins,
    NoSuchPin,
}

/// Hardware capability mismatch found while defining pins. The pin stays
/// in its group but is never configured nor driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinFault {
    AnalogOnlyOutput(u8),
    NoPwm(u8),
}

/// Reasons the persisted configuration was not (fully) applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    BadCrc(u16),
    BadVersion { found: u16, expected: u16 },
    UnknownTag(u8),
    MalformedRecord(u8),
    BadRecord(ConfigError),
}

impl From<ConfigError> for LoadError {
    fn from(err: ConfigError) -> Self {
        LoadError::BadRecord(err)
    }
}

impl uDisplay for ConfigError {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            ConfigError::InvalidModuleId(id) => uwrite!(f, "invalid module id {}", id),
            ConfigError::UndefinedPinType => f.write_str("undefined pin type"),
            ConfigError::UnknownPinType(raw) => uwrite!(f, "unknown pin type {}", raw),
            ConfigError::MalformedPinList => f.write_str("malformed pin list"),
            ConfigError::TooManyPins => f.write_str("too many pins"),
            ConfigError::NoSuchPin => f.write_str("no such pin"),
        }
    }
}

impl uDisplay for PinFault {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            PinFault::AnalogOnlyOutput(pin) => {
                uwrite!(f, "pin {}: cannot be configured as a digital output", pin)
            }
            PinFault::NoPwm(pin) => uwrite!(f, "pin {}: invalid PWM pin", pin),
        }
    }
}

impl uDisplay for LoadError {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            LoadError::BadCrc(crc) => uwrite!(f, "bad EEPROM CRC (residue {})", crc),
            LoadError::BadVersion { found, expected } => {
                uwrite!(f, "bad version {} (waiting {})", found, expected)
            }
            LoadError::UnknownTag(tag) => uwrite!(f, "unknown record tag {}", tag),
            LoadError::MalformedRecord(tag) => uwrite!(f, "malformed record, tag {}", tag),
            LoadError::BadRecord(err) => uwrite!(f, "bad record: {}", err),
        }
    }
}
