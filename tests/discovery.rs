use patchbay_module::config::DISCOVERY_STEPS;
use patchbay_module::hal::sim::SimBoard;
use patchbay_module::{Module, ModuleId, PinType, Reader};

const OUTPUTS: [u8; 2] = [2, 3];
const INPUTS: [u8; 2] = [7, 8];

fn pair(board: &mut SimBoard) -> (Module, Module) {
    let mut sender = Module::new(ModuleId::new(1).unwrap());
    sender.define_pins(board, PinType::SocketOutput, &OUTPUTS).unwrap();

    let mut receiver = Module::new(ModuleId::new(2).unwrap());
    receiver.define_pins(board, PinType::SocketInput, &INPUTS).unwrap();
    (sender, receiver)
}

/// Runs one discovery cycle with both modules stepping in lock-step.
fn cycle(board: &mut SimBoard, sender: &mut Module, receiver: &mut Module) {
    for step in 0..DISCOVERY_STEPS {
        sender.step_discovery(board, step);
        receiver.step_discovery(board, step);
    }
}

#[test]
fn patch_cable_is_discovered_and_released() {
    let mut board = SimBoard::new();
    let (mut sender, mut receiver) = pair(&mut board);
    assert!(board.connect(OUTPUTS[1], INPUTS[0]));

    cycle(&mut board, &mut sender, &mut receiver);
    assert!(receiver.drain_connection_changes(Reader::Console).is_empty());

    cycle(&mut board, &mut sender, &mut receiver);
    let changes = receiver.drain_connection_changes(Reader::Console);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].index, 0);
    assert_eq!(changes[0].connection.module_id, 1);
    assert_eq!(changes[0].connection.pin_id, 1);
    assert!(changes[0].connection.is_connected);

    // the untouched socket never reports
    assert_eq!(receiver.connection(1).map(|c| c.is_connected), Some(false));

    for _ in 0..3 {
        cycle(&mut board, &mut sender, &mut receiver);
    }
    assert!(receiver.drain_connection_changes(Reader::Console).is_empty());

    board.disconnect(OUTPUTS[1], INPUTS[0]);
    cycle(&mut board, &mut sender, &mut receiver);
    cycle(&mut board, &mut sender, &mut receiver);
    let changes = receiver.drain_connection_changes(Reader::Console);
    assert_eq!(changes.len(), 1);
    assert!(!changes[0].connection.is_connected);

    cycle(&mut board, &mut sender, &mut receiver);
    assert!(receiver.drain_connection_changes(Reader::Console).is_empty());
}

#[test]
fn readers_drain_independently() {
    let mut board = SimBoard::new();
    let (mut sender, mut receiver) = pair(&mut board);
    assert!(board.connect(OUTPUTS[0], INPUTS[1]));

    cycle(&mut board, &mut sender, &mut receiver);
    cycle(&mut board, &mut sender, &mut receiver);

    let console = receiver.drain_connection_changes(Reader::Console);
    assert_eq!(console.len(), 1);
    assert_eq!(console[0].index, 1);
    assert!(receiver.drain_connection_changes(Reader::Console).is_empty());

    let link = receiver.drain_connection_changes(Reader::Link);
    assert_eq!(link, console);
}

#[test]
fn module_cycle_wires_to_itself() {
    let mut board = SimBoard::new();
    let mut module = Module::new(ModuleId::new(126).unwrap());
    module.define_pins(&mut board, PinType::SocketOutput, &[4]).unwrap();
    module.define_pins(&mut board, PinType::SocketInput, &[5]).unwrap();
    assert!(board.connect(4, 5));

    module.run_discovery_cycle(&mut board);
    module.run_discovery_cycle(&mut board);

    let conn = module.connection(0).unwrap();
    assert!(conn.is_connected);
    assert_eq!(conn.module_id, 126);
    assert_eq!(conn.pin_id, 0);
}
