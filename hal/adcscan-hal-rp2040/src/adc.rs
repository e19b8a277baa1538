//! ADC channel management
//!
//! RP2040 has a single ADC with 5 channels:
//! - ADC0: GPIO26
//! - ADC1: GPIO27
//! - ADC2: GPIO28
//! - ADC3: GPIO29
//! - ADC4: Internal temperature sensor
//!
//! Conversions are started and collected through the ADC registers
//! directly, because the embassy driver only offers reads that wait for
//! the result. The embassy driver is still used to power up the block and
//! configure the input pads.

use adcscan_hal::ScanAdc;
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::pac;

/// ADC channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// ADC0 on GPIO26
    Adc0,
    /// ADC1 on GPIO27
    Adc1,
    /// ADC2 on GPIO28
    Adc2,
    /// ADC3 on GPIO29
    Adc3,
    /// Internal temperature sensor
    Temperature,
}

impl AdcChannel {
    /// Value for the AINSEL mux field
    pub fn ainsel(&self) -> u8 {
        *self as u8
    }
}

/// Round-robin scan converter
///
/// Scan slot `i` converts `inputs[i]`.
pub struct RpScanAdc<'d, const N: usize> {
    _adc: Adc<'d, Blocking>,
    _pads: [Channel<'d>; N],
    inputs: [AdcChannel; N],
}

impl<'d, const N: usize> RpScanAdc<'d, N> {
    /// Take over a powered-up ADC and its configured input pads
    pub fn new(adc: Adc<'d, Blocking>, pads: [Channel<'d>; N], inputs: [AdcChannel; N]) -> Self {
        Self {
            _adc: adc,
            _pads: pads,
            inputs,
        }
    }

    pub fn inputs(&self) -> &[AdcChannel; N] {
        &self.inputs
    }
}

impl<'d, const N: usize> ScanAdc for RpScanAdc<'d, N> {
    fn start_conversion(&mut self, channel: u8) {
        let Some(input) = self.inputs.get(channel as usize) else {
            return;
        };
        let ainsel = input.ainsel();
        pac::ADC.cs().modify(|w| {
            w.set_ainsel(ainsel);
            w.set_start_once(true);
        });
    }

    fn conversion_complete(&self) -> bool {
        pac::ADC.cs().read().ready()
    }

    fn read_conversion(&mut self) -> u16 {
        pac::ADC.result().read().result()
    }
}
