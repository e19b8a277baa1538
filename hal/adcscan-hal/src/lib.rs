//! adcscan Hardware Abstraction Layer
//!
//! This crate defines the narrow hardware interface the sampling core
//! needs. Chip-specific crates (RP2040, host simulation, etc.) implement
//! these traits so the same interrupt handler and reporting loop run on
//! every platform.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  adcscan-core (handler, report loop)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  adcscan-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ adcscan-hal-  │       │ adcscan-host  │
//! │    rp2040     │       │  (simulated)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`timer::PeriodicTimer`] - Free-running periodic interrupt source
//! - [`adc::ScanAdc`] - Single-shot, channel-selectable ADC
//! - [`uart::UartTx`] - Byte-oriented report output
//! - [`gpio::OutputPin`] - Diagnostic load indicator pin

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::ScanAdc;
pub use gpio::{EhOutput, OutputPin};
pub use timer::PeriodicTimer;
pub use uart::{EioTx, UartTx};
