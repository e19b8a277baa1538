//! Periodic timer abstraction
//!
//! The timer is the only interrupt source the sampling core cares about.
//! It counts in hardware ticks of a fixed, chip-specific length and raises
//! an interrupt every `period_ticks` ticks until stopped.

/// Free-running periodic interrupt source
///
/// The interrupt service routine for the timer must call the sampling
/// handler and then [`PeriodicTimer::clear_pending`] before returning.
pub trait PeriodicTimer {
    /// Error type for configuration
    type Error;

    /// Program the reload value
    ///
    /// Called once at startup before [`PeriodicTimer::start`]. A period the
    /// hardware cannot represent is a fatal configuration error.
    fn configure_periodic(&mut self, period_ticks: u32) -> Result<(), Self::Error>;

    /// Enable counting and the interrupt source
    fn start(&mut self);

    /// Disable the interrupt source
    ///
    /// Must be callable from the foreground context while the timer is
    /// running. Once this returns, no further interrupt is raised.
    fn stop(&mut self);

    /// Acknowledge the current firing
    ///
    /// Clears the pending-interrupt flag and, for timers that need it,
    /// re-arms the next period.
    fn clear_pending(&mut self);

    /// Check whether the interrupt source is enabled
    fn is_running(&self) -> bool;
}
