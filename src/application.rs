//! Control loop of the module.
//!
//! One `tick` samples every pin; every `DISCOVERY_PERIOD_TICKS` ticks a
//! discovery cycle runs over the sockets. The console reader's changes
//! are written to the log, the link reader's are left for `link_report`.

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::config::DISCOVERY_PERIOD_TICKS;
use crate::error::ConfigError;
use crate::hal::Board;
use crate::link;
use crate::logger::Logger;
use crate::module::{Module, ModuleId};
use crate::pins::{parse_pin_list, ConnectionChange, PinType, Reader, ValueChange};
use crate::storage::Store;

/// Main application state and logic
pub struct Application<B, S, W: uWrite> {
    board: B,
    store: S,
    logger: Logger<W>,
    module: Module,
    ticks: u16,
}

impl<B: Board, S: Store, W: uWrite> Application<B, S, W> {
    pub fn new(board: B, store: S, logger: Logger<W>) -> Self {
        Self {
            board,
            store,
            logger,
            module: Module::default(),
            ticks: 0,
        }
    }

    /// Loads the stored configuration. Returns false when the defaults
    /// stay in effect.
    pub fn boot(&mut self) -> bool {
        self.logger.system("patch-bay module v0.1.0");

        let loaded = match self.module.load(&mut self.board, &mut self.store) {
            Ok(()) => {
                self.logger.system(&Loaded(self.module.module_id()));
                true
            }
            Err(err) => {
                self.logger.error(&err);
                self.logger.system("keeping default configuration");
                false
            }
        };

        self.log_faults();
        // the controller expects a full picture after a restart
        self.module.request_full_state(Reader::Link);
        loaded
    }

    pub fn tick(&mut self) {
        self.module.update_all(&mut self.board);

        self.ticks += 1;
        if self.ticks >= DISCOVERY_PERIOD_TICKS {
            self.ticks = 0;
            self.module.run_discovery_cycle(&mut self.board);
        }

        self.report_console_changes();
    }

    /// Defines pins from operator text. Returns how many pins were left
    /// unconfigured.
    pub fn define_pins(&mut self, pin_type: PinType, text: &str) -> Result<usize, ConfigError> {
        let pins = parse_pin_list(text)?;
        let faults = self
            .module
            .define_pins(&mut self.board, pin_type, &pins)
            .map_err(|err| {
                self.logger.error(&err);
                err
            })?;
        for fault in faults.iter() {
            self.logger.error(fault);
        }
        Ok(faults.len())
    }

    pub fn set_module_id(&mut self, id: u8) -> Result<(), ConfigError> {
        let id = ModuleId::new(id).map_err(|err| {
            self.logger.error(&err);
            err
        })?;
        self.module.set_module_id(id);
        Ok(())
    }

    pub fn set_value(&mut self, pin_type: PinType, index: u8, value: u16) -> Result<(), ConfigError> {
        self.module.set_value(&mut self.board, pin_type, index, value)
    }

    pub fn save(&mut self) {
        self.module.save(&mut self.store);
        self.logger.system("configuration saved");
    }

    /// Fills `buf` with the link reader's pending changes.
    pub fn link_report(&mut self, buf: &mut [u8]) -> usize {
        link::encode_changes(&mut self.module, buf)
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn logger_mut(&mut self) -> &mut Logger<W> {
        &mut self.logger
    }

    fn report_console_changes(&mut self) {
        for pin_type in [PinType::AnalogInput, PinType::DigitalInput] {
            for change in self.module.drain_value_changes(pin_type, Reader::Console) {
                self.logger.sensor(&ValueEvent { pin_type, change });
            }
        }

        let module_id = self.module.module_id();
        for change in self.module.drain_connection_changes(Reader::Console) {
            self.logger.sensor(&ConnectionEvent { module_id, change });
        }
    }

    fn log_faults(&mut self) {
        for pin_type in PinType::ALL {
            let Some(group) = self.module.group(pin_type) else {
                continue;
            };
            for idx in 0..group.len() as u8 {
                match group.get(idx) {
                    Some(sample) if !sample.is_configured() => {
                        self.logger.error(&Unconfigured(sample.pin()));
                    }
                    _ => {}
                }
            }
        }
    }
}

struct Loaded(u8);

impl uDisplay for Loaded {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(f, "configuration loaded, module {}", self.0)
    }
}

struct Unconfigured(u8);

impl uDisplay for Unconfigured {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(f, "pin {}: left unconfigured", self.0)
    }
}

struct ValueEvent {
    pin_type: PinType,
    change: ValueChange,
}

impl uDisplay for ValueEvent {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(
            f,
            "{} [{}] = {}",
            self.pin_type.label(),
            self.change.index,
            self.change.value
        )
    }
}

struct ConnectionEvent {
    module_id: u8,
    change: ConnectionChange,
}

impl uDisplay for ConnectionEvent {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let from = self.change.connection;
        let label = if from.is_connected {
            "connection"
        } else {
            "disconnection"
        };
        uwrite!(
            f,
            "{} [{}.{}] -> [{}.{}]",
            label,
            from.module_id,
            from.pin_id,
            self.module_id,
            self.change.index
        )
    }
}
