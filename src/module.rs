//! One patch-bay module: a pin group per pin type, the discovery cycle
//! across socket groups, and persistence of the whole configuration.

use heapless::Vec;

use crate::config::{DEFAULT_MODULE_ID, DISCOVERY_STEPS, MAX_MODULE_ID, MAX_PINS_PER_GROUP};
use crate::error::{ConfigError, LoadError, PinFault};
use crate::hal::Board;
use crate::pins::{
    Connection, ConnectionChange, PinGroup, PinList, PinType, Reader, SamplingConfig, ValueChange,
};
use crate::storage::{ConfigStore, Store, Tag};

/// Module identity, 0..=126. The upper bound keeps the socket identity
/// word clear of the 0xFFFF "nothing connected" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleId(u8);

impl ModuleId {
    pub fn new(id: u8) -> Result<Self, ConfigError> {
        if id > MAX_MODULE_ID {
            return Err(ConfigError::InvalidModuleId(id));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self(DEFAULT_MODULE_ID)
    }
}

pub type PinFaults = Vec<PinFault, MAX_PINS_PER_GROUP>;

pub struct Module {
    module_id: ModuleId,
    groups: [PinGroup; PinType::COUNT],
    sampling: SamplingConfig,
}

impl Module {
    pub fn new(module_id: ModuleId) -> Self {
        Self {
            module_id,
            groups: PinType::ALL.map(PinGroup::new),
            sampling: SamplingConfig::default(),
        }
    }

    pub fn module_id(&self) -> u8 {
        self.module_id.get()
    }

    pub fn set_module_id(&mut self, module_id: ModuleId) {
        self.module_id = module_id;
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// New tunables apply from the next update; a new filter shift only
    /// to analog pins defined afterwards.
    pub fn set_sampling(&mut self, sampling: SamplingConfig) {
        self.sampling = sampling.with_filter_shift(sampling.filter_shift);
    }

    pub fn group(&self, pin_type: PinType) -> Option<&PinGroup> {
        pin_type.group_index().map(|idx| &self.groups[idx])
    }

    pub fn group_mut(&mut self, pin_type: PinType) -> Option<&mut PinGroup> {
        pin_type.group_index().map(|idx| &mut self.groups[idx])
    }

    fn try_group_mut(&mut self, pin_type: PinType) -> Result<&mut PinGroup, ConfigError> {
        self.group_mut(pin_type).ok_or(ConfigError::UndefinedPinType)
    }

    /// Replaces the pins of one type. Pins the board cannot serve in that
    /// role are returned as faults and left unconfigured.
    pub fn define_pins<B: Board>(
        &mut self,
        board: &mut B,
        pin_type: PinType,
        pins: &[u8],
    ) -> Result<PinFaults, ConfigError> {
        let sampling = self.sampling;
        self.try_group_mut(pin_type)?.define_pins(board, pins, &sampling)
    }

    /// Regular polling tick: samples every group.
    pub fn update_all<B: Board>(&mut self, board: &mut B) {
        for group in self.groups.iter_mut() {
            group.read_all(board, &self.sampling);
        }
    }

    /// One discovery step: even steps drive bit `step / 2` on the socket
    /// outputs, odd steps sample the same bit on the socket inputs.
    pub fn step_discovery<B: Board>(&mut self, board: &mut B, step: u8) {
        let bit = (step >> 1) & 0x0F;
        let module_id = self.module_id.get();
        if step & 1 == 0 {
            if let Some(outputs) = self.group_mut(PinType::SocketOutput) {
                outputs.serial_out_all(board, bit, module_id);
            }
        } else if let Some(inputs) = self.group_mut(PinType::SocketInput) {
            inputs.serial_in_all(board, bit);
        }
    }

    /// Full 32-step round exchanging one identity word on every socket.
    pub fn run_discovery_cycle<B: Board>(&mut self, board: &mut B) {
        for step in 0..DISCOVERY_STEPS {
            self.step_discovery(board, step);
        }
    }

    pub fn pin_count(&self, pin_type: PinType) -> usize {
        self.group(pin_type).map_or(0, PinGroup::len)
    }

    pub fn pins(&self, pin_type: PinType) -> PinList {
        self.group(pin_type).map(PinGroup::pins).unwrap_or_default()
    }

    pub fn value(&self, pin_type: PinType, index: u8) -> Option<u16> {
        self.group(pin_type)?.get(index).map(|sample| sample.value())
    }

    pub fn set_value<B: Board>(
        &mut self,
        board: &mut B,
        pin_type: PinType,
        index: u8,
        value: u16,
    ) -> Result<(), ConfigError> {
        self.try_group_mut(pin_type)?.set_value(board, index, value)
    }

    /// Peer currently seen on socket input `index`
    pub fn connection(&self, index: u8) -> Option<Connection> {
        self.group(PinType::SocketInput)?
            .get(index)
            .map(|sample| sample.connection())
    }

    pub fn drain_value_changes(
        &mut self,
        pin_type: PinType,
        reader: Reader,
    ) -> Vec<ValueChange, MAX_PINS_PER_GROUP> {
        match self.group_mut(pin_type) {
            Some(group) => group.drain_value_changes(reader),
            None => Vec::new(),
        }
    }

    pub fn drain_connection_changes(
        &mut self,
        reader: Reader,
    ) -> Vec<ConnectionChange, MAX_PINS_PER_GROUP> {
        match self.group_mut(PinType::SocketInput) {
            Some(group) => group.drain_connection_changes(reader),
            None => Vec::new(),
        }
    }

    /// Flags every input pin for `reader`, whose next drain then reports
    /// the complete current state.
    pub fn request_full_state(&mut self, reader: Reader) {
        for group in self.groups.iter_mut() {
            if group.pin_type().is_input() {
                group.mark_all(reader);
            }
        }
    }

    /// Writes the module id and every non-empty group, then seals the
    /// region with the version word and CRC.
    pub fn save<S: Store>(&self, store: &mut S) {
        let mut cfg = ConfigStore::new(store);
        cfg.rewind();
        cfg.put_record(Tag::ModuleId, &[self.module_id.get()]);

        for group in self.groups.iter().filter(|group| !group.is_empty()) {
            let mut payload: Vec<u8, { MAX_PINS_PER_GROUP + 1 }> = Vec::new();
            let _ = payload.push(group.pin_type() as u8);
            let _ = payload.extend_from_slice(&group.pins());
            cfg.put_record(Tag::Pin, &payload);
        }

        cfg.put_record(Tag::End, &[]);
        cfg.seal();
    }

    /// Replays a stored configuration.
    ///
    /// Nothing is applied unless CRC and version match. Replay stops at
    /// the first unknown tag (after skipping its payload) or invalid
    /// record; records replayed before it stay applied.
    pub fn load<B: Board, S: Store>(&mut self, board: &mut B, store: &mut S) -> Result<(), LoadError> {
        let mut cfg = ConfigStore::new(store);
        cfg.check()?;

        cfg.rewind();
        while !cfg.eof() {
            let raw_tag = cfg.get_u8();
            let len = cfg.get_u8() as usize;
            match Tag::from_u8(raw_tag) {
                Some(Tag::End) => break,
                Some(Tag::ModuleId) => {
                    if len != 1 {
                        return Err(LoadError::MalformedRecord(raw_tag));
                    }
                    self.module_id = ModuleId::new(cfg.get_u8())?;
                }
                Some(Tag::Pin) => {
                    if len == 0 {
                        return Err(LoadError::MalformedRecord(raw_tag));
                    }
                    let pin_type = PinType::try_from(cfg.get_u8())?;
                    let mut pins = PinList::new();
                    for _ in 1..len {
                        pins.push(cfg.get_u8()).map_err(|_| ConfigError::TooManyPins)?;
                    }
                    self.define_pins(board, pin_type, &pins)?;
                }
                None => {
                    cfg.skip(len);
                    return Err(LoadError::UnknownTag(raw_tag));
                }
            }
        }
        Ok(())
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new(ModuleId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimBoard;
    use crate::hal::PinState;
    use crate::storage::RamStore;

    fn module(id: u8) -> Module {
        Module::new(ModuleId::new(id).unwrap())
    }

    #[test]
    fn module_id_bounds() {
        assert!(ModuleId::new(126).is_ok());
        assert_eq!(ModuleId::new(127), Err(ConfigError::InvalidModuleId(127)));
        assert_eq!(ModuleId::new(255), Err(ConfigError::InvalidModuleId(255)));
    }

    #[test]
    fn undefined_type_is_rejected() {
        let mut board = SimBoard::new();
        let mut m = module(1);
        assert_eq!(
            m.define_pins(&mut board, PinType::Undefined, &[2]).err(),
            Some(ConfigError::UndefinedPinType)
        );
        assert_eq!(m.pin_count(PinType::Undefined), 0);
        assert!(m.drain_value_changes(PinType::Undefined, Reader::Link).is_empty());
    }

    #[test]
    fn update_all_fans_out() {
        let mut board = SimBoard::new();
        let mut m = module(1);
        m.define_pins(&mut board, PinType::DigitalInput, &[4, 5]).unwrap();
        m.define_pins(&mut board, PinType::AnalogInput, &[14]).unwrap();
        assert_eq!(m.pin_count(PinType::DigitalInput), 2);

        board.force(5, Some(PinState::Low));
        m.update_all(&mut board);

        let changes = m.drain_value_changes(PinType::DigitalInput, Reader::Console);
        assert_eq!(changes.as_slice(), &[ValueChange { index: 1, value: 0 }]);
        assert_eq!(m.value(PinType::DigitalInput, 1), Some(0));
        assert_eq!(m.value(PinType::DigitalInput, 2), None);
        assert!(m.drain_value_changes(PinType::AnalogInput, Reader::Console).is_empty());
    }

    #[test]
    fn discovery_between_two_modules() {
        let mut board = SimBoard::new();
        let mut a = module(5);
        let mut b = module(9);
        a.define_pins(&mut board, PinType::SocketOutput, &[2, 3, 4]).unwrap();
        b.define_pins(&mut board, PinType::SocketInput, &[7, 8]).unwrap();
        assert!(board.connect(4, 8));

        for _ in 0..2 {
            for step in 0..DISCOVERY_STEPS {
                a.step_discovery(&mut board, step);
                b.step_discovery(&mut board, step);
            }
        }

        let changes = b.drain_connection_changes(Reader::Link);
        assert_eq!(
            changes.as_slice(),
            &[ConnectionChange {
                index: 1,
                connection: Connection { module_id: 5, pin_id: 2, is_connected: true },
            }]
        );
        assert_eq!(b.connection(0).map(|c| c.is_connected), Some(false));
        // the console reader still has it
        assert_eq!(b.drain_connection_changes(Reader::Console).len(), 1);
    }

    #[test]
    fn request_full_state_marks_inputs() {
        let mut board = SimBoard::new();
        let mut m = module(1);
        m.define_pins(&mut board, PinType::DigitalInput, &[4, 5]).unwrap();
        m.define_pins(&mut board, PinType::DigitalOutput, &[8]).unwrap();

        m.request_full_state(Reader::Link);
        assert_eq!(m.drain_value_changes(PinType::DigitalInput, Reader::Link).len(), 2);
        assert!(m.drain_value_changes(PinType::DigitalOutput, Reader::Link).is_empty());
        assert!(m.drain_value_changes(PinType::DigitalInput, Reader::Console).is_empty());
    }

    #[test]
    fn set_sampling_clamps_shift() {
        let mut m = module(1);
        let sampling = SamplingConfig { filter_shift: 12, ..SamplingConfig::default() };
        m.set_sampling(sampling);
        assert_eq!(m.sampling().filter_shift, crate::config::MAX_FILTER_SHIFT);
    }

    #[test]
    fn save_writes_tlv_layout() {
        let mut board = SimBoard::new();
        let mut store = RamStore::<64>::new();
        let mut m = module(4);
        m.define_pins(&mut board, PinType::DigitalInput, &[4, 5]).unwrap();
        m.define_pins(&mut board, PinType::SocketOutput, &[2]).unwrap();
        m.save(&mut store);

        assert_eq!(
            &store.as_bytes()[..12],
            &[0, 1, 4, 1, 3, 1, 4, 5, 1, 2, 4, 2]
        );
        assert_eq!(&store.as_bytes()[12..14], &[0xFF, 0]);
        assert_eq!(
            &store.as_bytes()[60..62],
            &crate::config::CONFIG_VERSION.to_le_bytes()
        );
    }

    #[test]
    fn load_rejects_erased_store_untouched() {
        let mut board = SimBoard::new();
        let mut store = RamStore::<64>::new();
        let mut m = module(3);
        m.define_pins(&mut board, PinType::DigitalInput, &[4]).unwrap();

        assert!(matches!(m.load(&mut board, &mut store), Err(LoadError::BadCrc(_))));
        assert_eq!(m.module_id(), 3);
        assert_eq!(m.pins(PinType::DigitalInput).as_slice(), &[4]);
    }

    #[test]
    fn unknown_tag_aborts_after_skipping() {
        let mut board = SimBoard::new();
        let mut store = RamStore::<64>::new();
        {
            let mut cfg = ConfigStore::new(&mut store);
            cfg.put_record(Tag::ModuleId, &[12]);
            cfg.put_record(Tag::Pin, &[PinType::DigitalInput as u8, 4]);
            cfg.put_u8(0x42);
            cfg.put_u8(2);
            cfg.put_u8(0xAA);
            cfg.put_u8(0xBB);
            cfg.put_record(Tag::Pin, &[PinType::DigitalOutput as u8, 8]);
            cfg.put_record(Tag::End, &[]);
            cfg.seal();
        }

        let mut m = module(1);
        assert_eq!(m.load(&mut board, &mut store), Err(LoadError::UnknownTag(0x42)));
        // records ahead of the unknown one were applied, the rest not
        assert_eq!(m.module_id(), 12);
        assert_eq!(m.pins(PinType::DigitalInput).as_slice(), &[4]);
        assert_eq!(m.pin_count(PinType::DigitalOutput), 0);
    }

    #[test]
    fn out_of_range_module_id_record() {
        let mut board = SimBoard::new();
        let mut store = RamStore::<32>::new();
        {
            let mut cfg = ConfigStore::new(&mut store);
            cfg.put_record(Tag::ModuleId, &[200]);
            cfg.put_record(Tag::End, &[]);
            cfg.seal();
        }
        let mut m = module(1);
        assert_eq!(
            m.load(&mut board, &mut store),
            Err(LoadError::BadRecord(ConfigError::InvalidModuleId(200)))
        );
        assert_eq!(m.module_id(), 1);
    }
}
