//! Typed pins: per-pin sampling and the per-type groups that own them.

mod group;
mod sample;

pub use group::{PinGroup, PinList};
pub use sample::{PinSample, SamplingConfig};

use crate::error::ConfigError;

/// Role of a pin. The discriminant is the persisted type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum PinType {
    AnalogInput = 0,
    DigitalInput = 1,
    DigitalOutput = 2,
    SocketInput = 3,
    SocketOutput = 4,
    PwmOutput = 5,
    /// Placeholder for "no type"; never owns a group.
    Undefined = 0xFF,
}

impl PinType {
    pub const COUNT: usize = 6;

    /// Every type that owns a group, in group order.
    pub const ALL: [PinType; PinType::COUNT] = [
        PinType::AnalogInput,
        PinType::DigitalInput,
        PinType::DigitalOutput,
        PinType::SocketInput,
        PinType::SocketOutput,
        PinType::PwmOutput,
    ];

    /// Position of the type's group, `None` for `Undefined`.
    pub fn group_index(self) -> Option<usize> {
        match self {
            PinType::Undefined => None,
            defined => Some(defined as usize),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PinType::AnalogInput => "Analog Input",
            PinType::DigitalInput => "Digital Input",
            PinType::DigitalOutput => "Digital Output",
            PinType::SocketInput => "Socket Input",
            PinType::SocketOutput => "Socket Output",
            PinType::PwmOutput => "PWM Output",
            PinType::Undefined => "Undefined",
        }
    }

    /// Inputs whose changes are tracked per reader.
    pub fn is_input(self) -> bool {
        matches!(
            self,
            PinType::AnalogInput | PinType::DigitalInput | PinType::SocketInput
        )
    }
}

impl TryFrom<u8> for PinType {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(PinType::AnalogInput),
            1 => Ok(PinType::DigitalInput),
            2 => Ok(PinType::DigitalOutput),
            3 => Ok(PinType::SocketInput),
            4 => Ok(PinType::SocketOutput),
            5 => Ok(PinType::PwmOutput),
            0xFF => Ok(PinType::Undefined),
            other => Err(ConfigError::UnknownPinType(other)),
        }
    }
}

/// Independent consumer of change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reader {
    /// Link layer towards the patch-bay controller
    Link = 0,
    /// Diagnostic console
    Console = 1,
}

impl Reader {
    pub const COUNT: usize = 2;
    pub const ALL: [Reader; Reader::COUNT] = [Reader::Link, Reader::Console];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Peer seen on a socket input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub module_id: u8,
    pub pin_id: u8,
    pub is_connected: bool,
}

impl Connection {
    pub(crate) fn from_word(word: u16, is_connected: bool) -> Self {
        Self {
            module_id: (word >> 8) as u8,
            pin_id: (word & 0xFF) as u8,
            is_connected,
        }
    }
}

/// Parses an operator pin list such as `"2 3,4"` into physical pin numbers.
pub fn parse_pin_list(text: &str) -> Result<PinList, ConfigError> {
    let mut pins = PinList::new();
    for token in text
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
    {
        let pin = token.parse::<u8>().map_err(|_| ConfigError::MalformedPinList)?;
        pins.push(pin).map_err(|_| ConfigError::TooManyPins)?;
    }
    Ok(pins)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueChange {
    pub index: u8,
    pub value: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionChange {
    pub index: u8,
    pub connection: Connection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_byte_round_trips() {
        for ty in PinType::ALL {
            assert_eq!(PinType::try_from(ty as u8), Ok(ty));
        }
        assert_eq!(PinType::try_from(0xFF), Ok(PinType::Undefined));
        assert_eq!(PinType::try_from(9), Err(ConfigError::UnknownPinType(9)));
    }

    #[test]
    fn group_index_follows_all() {
        for (idx, ty) in PinType::ALL.iter().enumerate() {
            assert_eq!(ty.group_index(), Some(idx));
        }
        assert_eq!(PinType::Undefined.group_index(), None);
    }

    #[test]
    fn pin_list_parsing() {
        assert_eq!(parse_pin_list("2 3,4").unwrap().as_slice(), &[2, 3, 4]);
        assert_eq!(parse_pin_list(" 7 ,, 8 ").unwrap().as_slice(), &[7, 8]);
        assert!(parse_pin_list("").unwrap().is_empty());
        assert_eq!(parse_pin_list("2 x"), Err(ConfigError::MalformedPinList));
        assert_eq!(parse_pin_list("300"), Err(ConfigError::MalformedPinList));

        let too_long = "1 ".repeat(crate::config::MAX_PINS_PER_GROUP + 1);
        assert_eq!(parse_pin_list(&too_long), Err(ConfigError::TooManyPins));
    }

    #[test]
    fn connection_splits_word() {
        let conn = Connection::from_word(0x0503, true);
        assert_eq!(conn.module_id, 5);
        assert_eq!(conn.pin_id, 3);
    }
}
