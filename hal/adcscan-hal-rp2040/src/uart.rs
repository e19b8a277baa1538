//! UART report output
//!
//! Reports use a blocking transmitter, one byte at a time.

use adcscan_hal::UartTx;
use embassy_rp::uart::{self, Blocking};

/// Blocking report transmitter
pub struct RpUartTx<'d> {
    tx: uart::UartTx<'d, Blocking>,
}

impl<'d> RpUartTx<'d> {
    pub fn new(tx: uart::UartTx<'d, Blocking>) -> Self {
        Self { tx }
    }
}

impl<'d> UartTx for RpUartTx<'d> {
    type Error = uart::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.tx.blocking_write(&[byte])
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush()
    }
}
