//! Simulated peripherals
//!
//! [`SimulatedAdc`] behaves like a single data-register converter: a
//! conversion takes `latency` to finish, and reading the register before
//! that returns the previous result. [`SimPin`] records load-pin edges.

use std::time::{Duration, Instant};

use adcscan_hal::{OutputPin, ScanAdc};

/// Produces the raw value of a conversion for a channel
pub type Source = Box<dyn FnMut(u8) -> u16 + Send>;

/// Converter with a data register and a conversion time
pub struct SimulatedAdc {
    source: Source,
    latency: Duration,
    data: u16,
    in_flight: Option<(Instant, u16)>,
    conversions: u32,
}

impl SimulatedAdc {
    /// Converter fed by `source`, finishing instantly
    pub fn new(source: impl FnMut(u8) -> u16 + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            latency: Duration::ZERO,
            data: 0,
            in_flight: None,
            conversions: 0,
        }
    }

    /// 12-bit sawtooth per channel, phase-shifted by channel number
    pub fn ramp() -> Self {
        let mut step: u16 = 0;
        Self::new(move |channel| {
            step = step.wrapping_add(1);
            (u16::from(channel) * 1024).wrapping_add(step) & 0x0fff
        })
    }

    /// Set the conversion time
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Conversions started so far
    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    fn latch_if_done(&mut self) {
        if let Some((started, value)) = self.in_flight {
            if started.elapsed() >= self.latency {
                self.data = value;
                self.in_flight = None;
            }
        }
    }
}

impl ScanAdc for SimulatedAdc {
    fn start_conversion(&mut self, channel: u8) {
        self.latch_if_done();
        let value = (self.source)(channel);
        self.in_flight = Some((Instant::now(), value));
        self.conversions = self.conversions.wrapping_add(1);
    }

    fn conversion_complete(&self) -> bool {
        match self.in_flight {
            Some((started, _)) => started.elapsed() >= self.latency,
            None => true,
        }
    }

    fn read_conversion(&mut self) -> u16 {
        self.latch_if_done();
        self.data
    }
}

/// Load indicator pin that counts edges
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
    edges: u32,
}

impl SimPin {
    pub fn edges(&self) -> u32 {
        self.edges
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) {
        if !self.high {
            self.edges += 1;
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        if self.high {
            self.edges += 1;
        }
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
