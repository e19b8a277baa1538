//! adcscan-sim: run the scan on simulated hardware until Ctrl-C

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use adcscan_core::StopFlag;
use adcscan_host::{load_config, Result, ScanRuntime, SimPin, SimulatedAdc, StdoutSink};
use clap::Parser;
use log::{info, LevelFilter, Log, Metadata, Record};

/// Analog inputs scanned, as on the reference board
const CHANNELS: usize = 4;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interrupt-driven ADC scan on simulated hardware")]
struct Opts {
    /// Scan configuration (TOML); built-in defaults when omitted
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, value_name = "SECS")]
    seconds: Option<u64>,

    /// Simulated conversion time in microseconds
    #[arg(long, default_value_t = 0, value_name = "US")]
    latency_us: u64,

    /// Log debug messages
    #[arg(long, short)]
    verbose: bool,
}

/// Minimal stderr backend for the `log` facade
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> Result<()> {
    let opts = Opts::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if opts.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        });
    }

    let config = load_config(opts.config.as_deref())?;
    let adc = SimulatedAdc::ramp().with_latency(Duration::from_micros(opts.latency_us));

    let stop = Arc::new(StopFlag::new());
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.stop())?;
    }
    if let Some(secs) = opts.seconds {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            stop.stop();
        });
    }

    let mut runtime = ScanRuntime::<CHANNELS>::start(config, adc)?;
    info!(
        "scanning {} channels, {} firings/s, {} baud, report every {} ticks",
        CHANNELS,
        config.timebase.firings_in_ms(1000),
        config.baudrate,
        config.report_interval_ticks
    );

    let stats = runtime.run_until(StdoutSink::new(), SimPin::default(), &stop);
    info!(
        "{} reports, {} sink errors, {} skipped conversions",
        stats.reports,
        stats.sink_errors,
        runtime.shared().skipped_count()
    );
    Ok(())
}
