//! GPIO pin abstractions
//!
//! The foreground loop toggles an output pin on every report so CPU load
//! and report cadence can be watched on a scope or LED.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Adapter for any `embedded-hal` 1.0 output pin
///
/// Tracks the commanded level itself, since reading back an
/// `embedded-hal` pin needs `&mut self` and may fail. Pin errors are
/// discarded: the load indicator is best-effort.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: embedded_hal::digital::OutputPin> EhOutput<P> {
    /// Wrap a pin, driving it low
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
