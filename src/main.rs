#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use patchbay_module::hal::eeprom::Eeprom;
    use patchbay_module::hal::nano::NanoBoard;
    use patchbay_module::hal::uart::Usart0;
    use patchbay_module::logger::{Level, Logger, SerialWriter};
    use patchbay_module::Application;

    /// Busy-wait iterations between two control loop ticks, about 1 ms
    const TICK_SPINS: u16 = 4000;

    #[cfg(feature = "debug")]
    const LOG_LEVEL: Level = Level::Debug;
    #[cfg(not(feature = "debug"))]
    const LOG_LEVEL: Level = Level::Sensor;

    #[avr_device::entry]
    fn main() -> ! {
        let logger = Logger::new(SerialWriter::new(Usart0::new()), LOG_LEVEL);
        let mut app = Application::new(NanoBoard::new(), Eeprom::new(), logger);

        unsafe { avr_device::interrupt::enable() };

        app.boot();

        loop {
            app.tick();

            for _ in 0..TICK_SPINS {
                avr_device::asm::nop();
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
