//! UART serial output abstraction
//!
//! The report loop only ever transmits, one byte at a time, mirroring a
//! `putchar()` hook on the target.

/// UART transmitter
///
/// Trait for sending report bytes over a UART interface.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write a single byte
    ///
    /// Blocks until the byte has been accepted by the transmitter or an
    /// error occurs.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Adapter from any `embedded_io::Write` to [`UartTx`]
pub struct EioTx<W> {
    writer: W,
}

impl<W: embedded_io::Write> EioTx<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> UartTx for EioTx<W> {
    type Error = W::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.writer.write_all(&[byte])
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.writer.flush()
    }
}
