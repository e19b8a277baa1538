//! Board-agnostic core of the interrupt-driven ADC scan
//!
//! This crate contains all sampling logic that does not depend on a
//! specific chip:
//!
//! - Scan configuration and timer reload computation
//! - Lock-free shared sample buffer (single writer, any reader)
//! - Sampling handler run from the timer interrupt
//! - Timebase wrapper tying the handler to a [`PeriodicTimer`]
//! - Drift-free report schedule, report formatting and the foreground loop
//!
//! Data flows one way only:
//!
//! ```text
//! timer IRQ ──▶ SamplingHandler ──▶ SampleBuffer ──▶ ForegroundLoop ──▶ UART
//! ```
//!
//! [`PeriodicTimer`]: adcscan_hal::PeriodicTimer

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod report;
pub mod sampler;
pub mod shared;
pub mod timebase;

pub use config::{ConfigError, ConversionPolicy, ScanConfig, TimebaseConfig, MAX_CHANNELS};
pub use report::{ForegroundLoop, LoopStats, ReportError, ReportSchedule, ScheduleState, StopFlag};
pub use sampler::{FireOutcome, SamplingHandler};
pub use shared::{SampleBuffer, Snapshot};
pub use timebase::{StartupError, Timebase};
