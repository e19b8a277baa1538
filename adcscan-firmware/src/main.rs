//! adcscan - interrupt-driven ADC scan firmware
//!
//! TIMER alarm 1 fires every `period_us`. Its interrupt collects the
//! finished conversion of one analog input, stores it in the shared
//! sample buffer and starts the next input, round-robin over ADC0-ADC3.
//! The foreground loop prints the tick counter and all four values over
//! UART0 every `report_interval_ticks` firings and toggles the LED on each
//! report so CPU load can be watched on a scope.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use {defmt_rtt as _, panic_probe as _};

use adcscan_core::{
    ConversionPolicy, ForegroundLoop, SampleBuffer, SamplingHandler, ScanConfig, Timebase,
    TimebaseConfig,
};
use adcscan_hal_rp2040::{AdcChannel, EhOutput, RpAlarmTimer, RpScanAdc, RpUartTx, TIMER_TICK_US};

// Constants generated from scan.toml by build.rs
include!(concat!(env!("OUT_DIR"), "/scan_config.rs"));

/// Analog inputs in the scan (GPIO26-29)
const CHANNELS: usize = 4;

/// Written only from TIMER_IRQ_1, read by the foreground loop
static SAMPLES: SampleBuffer<CHANNELS> = SampleBuffer::new();

/// Everything the sampling interrupt owns
struct IsrContext {
    timebase: Timebase<RpAlarmTimer>,
    handler: SamplingHandler<'static, CHANNELS>,
    adc: RpScanAdc<'static, CHANNELS>,
}

static ISR: Mutex<CriticalSectionRawMutex, RefCell<Option<IsrContext>>> =
    Mutex::new(RefCell::new(None));

#[interrupt]
fn TIMER_IRQ_1() {
    ISR.lock(|cell| {
        if let Some(ctx) = cell.borrow_mut().as_mut() {
            ctx.timebase.fire(&mut ctx.handler, &mut ctx.adc);
        }
    });
}

fn scan_config() -> ScanConfig {
    ScanConfig {
        timebase: TimebaseConfig {
            tick_us: TIMER_TICK_US,
            period_us: SCAN_PERIOD_US,
            max_reload: u32::MAX,
        },
        report_interval_ticks: SCAN_REPORT_INTERVAL_TICKS,
        policy: SCAN_POLICY,
        baudrate: SCAN_BAUDRATE,
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("adcscan firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = scan_config();
    let reload = match config.validate() {
        Ok(reload) => reload,
        Err(e) => {
            error!("Invalid scan configuration: {}", e);
            defmt::panic!("halting before the sampling timer starts");
        }
    };
    info!(
        "Scan config: {} us period ({} ticks), report every {} ticks, {}",
        config.timebase.period_us, reload, config.report_interval_ticks, config.policy
    );

    // Report UART on GPIO0 (TX) / GPIO1 (RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.baudrate;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let (tx, _rx) = uart.split();
    let sink = RpUartTx::new(tx);

    // On-board LED as load indicator
    let load_pin = EhOutput::new(Output::new(p.PIN_25, Level::Low));

    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let pads = [
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_28, Pull::None),
        Channel::new_pin(p.PIN_29, Pull::None),
    ];
    let mut adc = RpScanAdc::new(
        adc,
        pads,
        [
            AdcChannel::Adc0,
            AdcChannel::Adc1,
            AdcChannel::Adc2,
            AdcChannel::Adc3,
        ],
    );

    // First conversion runs before the timer is enabled
    let mut handler = SamplingHandler::new(&SAMPLES, config.policy);
    handler.prime(&mut adc);

    // Started with interrupts masked so the first firing finds the context
    ISR.lock(|cell| match Timebase::start(RpAlarmTimer::new(), &config.timebase) {
        Ok(timebase) => {
            cell.replace(Some(IsrContext {
                timebase,
                handler,
                adc,
            }));
        }
        Err(e) => {
            error!("Timebase startup failed: {}", e);
            defmt::panic!("halting before the sampling timer starts");
        }
    });
    info!("Sampling {} channels", CHANNELS);

    let mut reporter = ForegroundLoop::new(&SAMPLES, config.report_interval_ticks, sink, load_pin);
    loop {
        match reporter.step() {
            Ok(Some(snapshot)) => trace!("Report at tick {}", snapshot.tick),
            Ok(None) => {}
            Err(e) => warn!("Report dropped: {}", e),
        }
        yield_now().await;
    }
}
