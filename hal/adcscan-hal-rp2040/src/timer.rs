//! Periodic interrupt on TIMER alarm 1
//!
//! The RP2040 TIMER is a free-running 1 MHz counter with four one-shot
//! alarms. Alarm 0 belongs to the embassy time driver; this module turns
//! alarm 1 into a periodic source by re-arming it from the interrupt,
//! always relative to the previous target so the period does not drift.
//!
//! The firmware owns the `TIMER_IRQ_1` handler and must call
//! [`PeriodicTimer::clear_pending`] from it.

use adcscan_hal::PeriodicTimer;
use embassy_rp::interrupt::{self, InterruptExt};
use embassy_rp::pac;

/// Length of one TIMER count in microseconds
pub const TIMER_TICK_US: u32 = 1;

const ALARM: usize = 1;

/// Timer configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// A zero period would re-fire forever
    ZeroPeriod,
}

/// TIMER alarm 1 driven as a periodic timer
pub struct RpAlarmTimer {
    period: u32,
    target: u32,
    running: bool,
}

impl Default for RpAlarmTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RpAlarmTimer {
    pub const fn new() -> Self {
        Self {
            period: 0,
            target: 0,
            running: false,
        }
    }

    /// Program the alarm for `self.target`
    ///
    /// If the target already passed while we were late, the alarm would
    /// only match after the counter wraps, so pend the interrupt instead.
    fn arm(&mut self) {
        let timer = pac::TIMER;
        timer.alarm(ALARM).write_value(self.target);

        let now = timer.timerawl().read();
        if (now.wrapping_sub(self.target) as i32) >= 0 {
            interrupt::TIMER_IRQ_1.pend();
        }
    }

    fn acknowledge() {
        pac::TIMER.intr().write(|w| w.set_alarm(ALARM, true));
    }
}

impl PeriodicTimer for RpAlarmTimer {
    type Error = TimerError;

    fn configure_periodic(&mut self, period_ticks: u32) -> Result<(), Self::Error> {
        if period_ticks == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        self.period = period_ticks;
        Ok(())
    }

    fn start(&mut self) {
        let timer = pac::TIMER;
        Self::acknowledge();
        interrupt::TIMER_IRQ_1.unpend();

        timer.inte().modify(|w| w.set_alarm(ALARM, true));
        self.target = timer.timerawl().read().wrapping_add(self.period);
        self.running = true;
        self.arm();

        // SAFETY: the firmware defines the TIMER_IRQ_1 handler before the
        // timer is started, and the handler only touches state behind a
        // critical-section mutex.
        unsafe { interrupt::TIMER_IRQ_1.enable() };
    }

    fn stop(&mut self) {
        let timer = pac::TIMER;
        interrupt::TIMER_IRQ_1.disable();
        timer.inte().modify(|w| w.set_alarm(ALARM, false));
        timer.armed().write(|w| w.set_armed(1 << ALARM));
        Self::acknowledge();
        interrupt::TIMER_IRQ_1.unpend();
        self.running = false;
    }

    fn clear_pending(&mut self) {
        Self::acknowledge();
        if self.running {
            self.target = self.target.wrapping_add(self.period);
            self.arm();
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
