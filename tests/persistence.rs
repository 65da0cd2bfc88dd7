use patchbay_module::config::CONFIG_VERSION;
use patchbay_module::hal::sim::SimBoard;
use patchbay_module::storage::RamStore;
use patchbay_module::{ConfigStore, LoadError, Module, ModuleId, PinType};

const REGION: usize = 64;

fn configured(board: &mut SimBoard) -> Module {
    let mut module = Module::new(ModuleId::new(42).unwrap());
    module.define_pins(board, PinType::AnalogInput, &[14, 15]).unwrap();
    module.define_pins(board, PinType::DigitalInput, &[2]).unwrap();
    module.define_pins(board, PinType::DigitalOutput, &[4, 7]).unwrap();
    module.define_pins(board, PinType::SocketInput, &[8, 12]).unwrap();
    module.define_pins(board, PinType::SocketOutput, &[13]).unwrap();
    module.define_pins(board, PinType::PwmOutput, &[9, 10, 11]).unwrap();
    module
}

#[test]
fn configuration_round_trips() {
    let mut board = SimBoard::new();
    let saved = configured(&mut board);
    let mut store = RamStore::<REGION>::new();
    saved.save(&mut store);

    let mut board = SimBoard::new();
    let mut loaded = Module::default();
    loaded.load(&mut board, &mut store).unwrap();

    assert_eq!(loaded.module_id(), 42);
    for pin_type in PinType::ALL {
        assert_eq!(loaded.pins(pin_type), saved.pins(pin_type));
    }
    assert_eq!(loaded.pin_count(PinType::PwmOutput), 3);
}

#[test]
fn any_flipped_byte_is_rejected() {
    let mut board = SimBoard::new();
    let mut store = RamStore::<REGION>::new();
    configured(&mut board).save(&mut store);

    for offset in 0..REGION - 2 {
        let mut damaged = store.clone();
        damaged.as_bytes_mut()[offset] ^= 0x01;

        let mut module = Module::default();
        let result = module.load(&mut SimBoard::new(), &mut damaged);
        assert!(matches!(result, Err(LoadError::BadCrc(_))), "offset {}", offset);
        // nothing was applied
        assert_eq!(module.module_id(), 0);
        assert_eq!(module.pin_count(PinType::AnalogInput), 0);
    }
}

#[test]
fn stale_version_is_rejected() {
    let mut board = SimBoard::new();
    let mut store = RamStore::<REGION>::new();
    configured(&mut board).save(&mut store);

    // rewrite the version word and reseal so only the version is wrong
    let old = CONFIG_VERSION.wrapping_sub(1).to_le_bytes();
    store.as_bytes_mut()[REGION - 4..REGION - 2].copy_from_slice(&old);
    let crc = ConfigStore::new(&mut store).crc(2);
    store.as_bytes_mut()[REGION - 2..].copy_from_slice(&crc.to_le_bytes());

    let mut module = Module::default();
    assert_eq!(
        module.load(&mut SimBoard::new(), &mut store),
        Err(LoadError::BadVersion {
            found: CONFIG_VERSION - 1,
            expected: CONFIG_VERSION,
        })
    );
    assert_eq!(module.pin_count(PinType::DigitalInput), 0);
}

#[test]
fn resave_replaces_previous_configuration() {
    let mut board = SimBoard::new();
    let mut store = RamStore::<REGION>::new();
    configured(&mut board).save(&mut store);

    let mut smaller = Module::new(ModuleId::new(3).unwrap());
    smaller.define_pins(&mut board, PinType::DigitalInput, &[5, 6]).unwrap();
    smaller.save(&mut store);

    let mut module = Module::default();
    module.load(&mut SimBoard::new(), &mut store).unwrap();
    assert_eq!(module.module_id(), 3);
    assert_eq!(module.pins(PinType::DigitalInput).as_slice(), &[5, 6]);
    assert_eq!(module.pin_count(PinType::AnalogInput), 0);
}
