//! Hardware timebase
//!
//! Owns the periodic timer and turns a [`TimebaseConfig`] into a running
//! interrupt source. The interrupt service routine calls [`Timebase::fire`],
//! which runs the sampling handler and acknowledges the interrupt.

use core::fmt;

use adcscan_hal::{PeriodicTimer, ScanAdc};

use crate::config::{ConfigError, TimebaseConfig};
use crate::sampler::{FireOutcome, SamplingHandler};

/// Startup failure, fatal by definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError<E> {
    /// The configured period cannot be represented
    Config(ConfigError),
    /// The timer rejected the reload value
    Timer(E),
}

impl<E> From<ConfigError> for StartupError<E> {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl<E: fmt::Debug> fmt::Display for StartupError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid timebase configuration: {}", err),
            Self::Timer(err) => write!(f, "timer configuration failed: {:?}", err),
        }
    }
}

/// A running periodic timer
pub struct Timebase<T: PeriodicTimer> {
    timer: T,
    reload: u32,
}

impl<T: PeriodicTimer> Timebase<T> {
    /// Configure the timer for the requested period and enable it
    ///
    /// The handler should be primed before this is called.
    pub fn start(mut timer: T, config: &TimebaseConfig) -> Result<Self, StartupError<T::Error>> {
        let reload = config.reload_ticks()?;
        timer
            .configure_periodic(reload)
            .map_err(StartupError::Timer)?;
        timer.start();
        Ok(Self { timer, reload })
    }

    /// Disable the interrupt source
    ///
    /// After this returns no further firing reaches the handler.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Reload value programmed into the timer
    pub fn reload_ticks(&self) -> u32 {
        self.reload
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Stop the timer and hand it back
    pub fn release(mut self) -> T {
        self.timer.stop();
        self.timer
    }

    /// Interrupt service routine body
    ///
    /// Runs the handler, then clears the pending flag so the timer is
    /// ready for the next period on every path.
    pub fn fire<A: ScanAdc, const N: usize>(
        &mut self,
        handler: &mut SamplingHandler<'_, N>,
        adc: &mut A,
    ) -> FireOutcome {
        let outcome = handler.on_fire(adc);
        self.timer.clear_pending();
        outcome
    }
}
