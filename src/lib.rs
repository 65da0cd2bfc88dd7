//! Firmware for one patch-bay module.
//!
//! A module exposes typed pins (analog and digital inputs, digital and PWM
//! outputs, patch sockets), reports their changes to several independent
//! readers, discovers which sockets are patched together, and keeps its
//! configuration in EEPROM.

#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod bitset;
pub mod config;
pub mod error;
pub mod hal;
pub mod link;
pub mod logger;
pub mod module;
pub mod pins;
pub mod storage;

pub use application::Application;
pub use bitset::BitSet;
pub use error::{ConfigError, LoadError, PinFault};
pub use module::{Module, ModuleId};
pub use pins::{Connection, PinGroup, PinSample, PinType, Reader, SamplingConfig};
pub use storage::{ConfigStore, Store};
