//! ADC abstraction
//!
//! Models a converter with a single data register that is started for one
//! channel at a time, as found on most small microcontrollers.

/// Single-shot, channel-selectable ADC
///
/// All methods are infallible: they run in interrupt context where there
/// is no error path. A conversion that has not finished yet is visible via
/// [`ScanAdc::conversion_complete`].
pub trait ScanAdc {
    /// Select `channel` and start one conversion
    fn start_conversion(&mut self, channel: u8);

    /// Check if the last started conversion has finished
    fn conversion_complete(&self) -> bool;

    /// Read the data register
    ///
    /// Returns whatever the register currently holds, which is the previous
    /// result if the running conversion has not finished.
    fn read_conversion(&mut self) -> u16;
}
