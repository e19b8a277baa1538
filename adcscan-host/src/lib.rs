//! Host simulation of the adcscan sampling loop
//!
//! Runs the board-agnostic core against simulated peripherals:
//!
//! - [`ThreadTimebase`] - periodic firing thread standing in for the timer IRQ
//! - [`SimulatedAdc`] - data-register converter with a conversion time
//! - [`StdoutSink`] / [`MemorySink`] - report outputs
//! - [`ScanRuntime`] - everything wired together
//!
//! Configuration is read from TOML, see [`load_config`].

pub mod config;
pub mod error;
pub mod runtime;
pub mod sim;
pub mod sink;
pub mod timebase;

pub use config::{load_config, parse_config, DEFAULT_CONFIG};
pub use error::{HostError, Result};
pub use runtime::ScanRuntime;
pub use sim::{SimPin, SimulatedAdc};
pub use sink::{MemorySink, StdoutSink};
pub use timebase::{SimTimer, ThreadTimebase};
