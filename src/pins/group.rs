//! All pins of one type, and the per-reader dirty masks over them.

use heapless::Vec;

use crate::bitset::BitSet;
use crate::config::MAX_PINS_PER_GROUP;
use crate::error::{ConfigError, PinFault};
use crate::hal::Board;

use super::{ConnectionChange, PinSample, PinType, Reader, SamplingConfig, ValueChange};

/// Ordered physical pin numbers of a group
pub type PinList = Vec<u8, MAX_PINS_PER_GROUP>;

#[derive(Debug, Clone)]
pub struct PinGroup {
    pin_type: PinType,
    samples: Vec<PinSample, MAX_PINS_PER_GROUP>,
    dirty: [BitSet; Reader::COUNT],
}

impl PinGroup {
    pub fn new(pin_type: PinType) -> Self {
        Self {
            pin_type,
            samples: Vec::new(),
            dirty: [BitSet::new(0), BitSet::new(0)],
        }
    }

    /// Replaces the group's pins; logical indices follow the list order.
    ///
    /// Pins the board cannot serve in this role are kept unconfigured and
    /// returned as faults. Too long a list leaves the group untouched.
    pub fn define_pins<B: Board>(
        &mut self,
        board: &mut B,
        pins: &[u8],
        config: &SamplingConfig,
    ) -> Result<Vec<PinFault, MAX_PINS_PER_GROUP>, ConfigError> {
        if pins.len() > MAX_PINS_PER_GROUP {
            return Err(ConfigError::TooManyPins);
        }

        let mut faults = Vec::new();
        self.samples.clear();
        for (index, &pin) in pins.iter().enumerate() {
            let mut sample = PinSample::new(self.pin_type, pin, index as u8);
            if let Err(fault) = sample.init(board, config) {
                // same bound as `samples`
                let _ = faults.push(fault);
            }
            let _ = self.samples.push(sample);
        }

        let count = self.samples.len() as u8;
        self.dirty = [BitSet::new(count), BitSet::new(count)];
        Ok(faults)
    }

    /// Samples every pin and flags changes for every reader.
    pub fn read_all<B: Board>(&mut self, board: &mut B, config: &SamplingConfig) {
        for sample in self.samples.iter_mut() {
            if sample.update(board, config) {
                for mask in self.dirty.iter_mut() {
                    mask.set(sample.index(), true);
                }
            }
        }
    }

    pub fn serial_out_all<B: Board>(&mut self, board: &mut B, bit: u8, module_id: u8) {
        for sample in self.samples.iter_mut() {
            sample.serial_out(board, bit, module_id);
        }
    }

    pub fn serial_in_all<B: Board>(&mut self, board: &mut B, bit: u8) {
        for sample in self.samples.iter_mut() {
            if sample.serial_in(board, bit) {
                for mask in self.dirty.iter_mut() {
                    mask.set(sample.index(), true);
                }
            }
        }
    }

    /// Takes `reader`'s pending value changes, in ascending index order.
    pub fn drain_value_changes(&mut self, reader: Reader) -> Vec<ValueChange, MAX_PINS_PER_GROUP> {
        self.drain(reader, |sample| ValueChange {
            index: sample.index(),
            value: sample.value(),
        })
    }

    /// Takes `reader`'s pending connection changes, in ascending index order.
    pub fn drain_connection_changes(
        &mut self,
        reader: Reader,
    ) -> Vec<ConnectionChange, MAX_PINS_PER_GROUP> {
        self.drain(reader, |sample| ConnectionChange {
            index: sample.index(),
            connection: sample.connection(),
        })
    }

    fn drain<T>(
        &mut self,
        reader: Reader,
        event: impl Fn(&PinSample) -> T,
    ) -> Vec<T, MAX_PINS_PER_GROUP> {
        let mut events = Vec::new();
        let mask = &mut self.dirty[reader.index()];
        for sample in self.samples.iter() {
            if mask.get(sample.index()) {
                mask.set(sample.index(), false);
                let _ = events.push(event(sample));
            }
        }
        events
    }

    /// Indices still pending for `reader`, without consuming them.
    pub fn pending(&self, reader: Reader) -> impl Iterator<Item = u8> + '_ {
        let mask = &self.dirty[reader.index()];
        (0..self.samples.len() as u8).filter(move |&idx| mask.get(idx))
    }

    pub fn acknowledge(&mut self, reader: Reader, index: u8) {
        self.dirty[reader.index()].set(index, false);
    }

    /// Flags every pin for `reader` so its next drain reports the full state.
    pub fn mark_all(&mut self, reader: Reader) {
        self.dirty[reader.index()].set_all();
    }

    pub fn has_changes(&self, reader: Reader) -> bool {
        self.dirty[reader.index()].any()
    }

    pub fn set_value<B: Board>(&mut self, board: &mut B, index: u8, value: u16) -> Result<(), ConfigError> {
        let sample = self
            .samples
            .get_mut(index as usize)
            .ok_or(ConfigError::NoSuchPin)?;
        sample.set_value(board, value);
        Ok(())
    }

    pub fn get(&self, index: u8) -> Option<&PinSample> {
        self.samples.get(index as usize)
    }

    pub fn pins(&self) -> PinList {
        self.samples.iter().map(PinSample::pin).collect()
    }

    pub fn pin_type(&self) -> PinType {
        self.pin_type
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
