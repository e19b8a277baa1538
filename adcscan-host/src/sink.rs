//! Report sinks
//!
//! Host stand-ins for the UART transmitter.

use std::io::{self, BufWriter, Stdout, Write};
use std::sync::Arc;

use adcscan_hal::UartTx;
use parking_lot::Mutex;

/// Writes report bytes to standard output
pub struct StdoutSink {
    out: BufWriter<Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl UartTx for StdoutSink {
    type Error = io::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.out.write_all(&[byte])
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.out.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.out.flush()
    }
}

/// Collects report bytes in memory
///
/// Clones share the same buffer, so a test can keep one handle while the
/// loop owns another.
#[derive(Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Completed lines, without their newline
    pub fn lines(&self) -> Vec<String> {
        let text = self.contents();
        text.split_inclusive('\n')
            .filter(|line| line.ends_with('\n'))
            .map(|line| line.trim_end_matches('\n').to_owned())
            .collect()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl UartTx for MemorySink {
    type Error = core::convert::Infallible;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.buf.lock().push(byte);
        Ok(())
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.buf.lock().extend_from_slice(data);
        Ok(())
    }
}
