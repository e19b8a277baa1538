//! RP2040-specific HAL for the adcscan firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `adcscan-hal` traits:
//!
//! - TIMER alarm 1 as the periodic sampling interrupt
//! - Single-shot ADC conversions driven from interrupt context
//! - Blocking UART transmitter for reports

#![no_std]

pub mod adc;
pub mod timer;
pub mod uart;

pub use adc::{AdcChannel, RpScanAdc};
pub use timer::{RpAlarmTimer, TimerError, TIMER_TICK_US};
pub use uart::RpUartTx;

// Re-export shared traits from adcscan-hal for convenience
pub use adcscan_hal::{EhOutput, OutputPin, PeriodicTimer, ScanAdc, UartTx};
