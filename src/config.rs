//! Configuration constants for the patch-bay module firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Module id used until a valid configuration has been loaded
pub const DEFAULT_MODULE_ID: u8 = 0;

/// Highest module id the configuration layer accepts
pub const MAX_MODULE_ID: u8 = 126;

/// Pins a single group can hold. Must stay below 255 so that a socket
/// identity word never collides with the 0xFFFF "nothing connected" value.
pub const MAX_PINS_PER_GROUP: usize = 24;

/// Update cycles a digital input ignores after a reported change
pub const DEBOUNCE_DELAY: u8 = 5;

/// Analog IIR filter constant, the filter weight is 1/(1 << FILTER_SHIFT)
pub const FILTER_SHIFT: u8 = 2;

/// Largest filter shift that keeps a 10-bit sample accumulator in 16 bits
pub const MAX_FILTER_SHIFT: u8 = 6;

/// Accumulator delta above which an analog input reports a change
pub const ANALOG_THRESHOLD: u16 = 6;

/// Schema tag of the persisted configuration, bump on incompatible changes
pub const CONFIG_VERSION: u16 = 0x07F8;

/// Steps of a full discovery cycle (16 bits, drive then sample)
pub const DISCOVERY_STEPS: u8 = 32;

/// Control loop ticks between two discovery cycles
pub const DISCOVERY_PERIOD_TICKS: u16 = 10;

/// Size of one link-consumer change report
pub const LINK_REPORT_SIZE: usize = 12;
