//! Line logger over any `ufmt` writer.
//!
//! Each line is `[TAG] message\r\n`. On the board the writer is the
//! serial console; write errors are dropped, logging never fails the
//! caller.

use embedded_hal::serial;
use ufmt::{uDisplay, uWrite, uwrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error = 0,
    System = 1,
    Sensor = 2,
    Debug = 3,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Error => "[ERR]",
            Level::System => "[SYS]",
            Level::Sensor => "[SNS]",
            Level::Debug => "[DBG]",
        }
    }
}

pub struct Logger<W: uWrite> {
    writer: W,
    max_level: Level,
}

impl<W: uWrite> Logger<W> {
    pub fn new(writer: W, max_level: Level) -> Self {
        Self { writer, max_level }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    pub fn set_max_level(&mut self, level: Level) {
        self.max_level = level;
    }

    pub fn log<M: uDisplay + ?Sized>(&mut self, level: Level, msg: &M) {
        if !self.enabled(level) {
            return;
        }
        let _ = uwrite!(self.writer, "{} {}\r\n", level.tag(), msg);
    }

    pub fn error<M: uDisplay + ?Sized>(&mut self, msg: &M) {
        self.log(Level::Error, msg);
    }

    pub fn system<M: uDisplay + ?Sized>(&mut self, msg: &M) {
        self.log(Level::System, msg);
    }

    pub fn sensor<M: uDisplay + ?Sized>(&mut self, msg: &M) {
        self.log(Level::Sensor, msg);
    }

    pub fn debug<M: uDisplay + ?Sized>(&mut self, msg: &M) {
        self.log(Level::Debug, msg);
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// `uWrite` adapter for a blocking byte serial port.
pub struct SerialWriter<S> {
    serial: S,
}

impl<S: serial::Write<u8>> SerialWriter<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn release(self) -> S {
        self.serial
    }
}

impl<S: serial::Write<u8>> uWrite for SerialWriter<S> {
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            nb::block!(self.serial.write(byte))?;
        }
        Ok(())
    }
}
