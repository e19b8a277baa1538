//! LED blink by busy-waiting, with no interrupts involved
//!
//! Bring-up check for a board: if the LED blinks at 1 Hz the clocks,
//! flash and GPIO are fine.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use embassy_rp::gpio::{Level, Output};
use {defmt_rtt as _, panic_probe as _};

use adcscan_hal_rp2040::{EhOutput, OutputPin};

/// Half a second at the default 125 MHz system clock
const HALF_PERIOD_CYCLES: u32 = 62_500_000;

#[entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    let mut led = EhOutput::new(Output::new(p.PIN_25, Level::Low));
    defmt::info!("Blinking without interrupts");

    loop {
        led.toggle();
        cortex_m::asm::delay(HALF_PERIOD_CYCLES);
    }
}
