//! Thread-backed timebase
//!
//! A dedicated thread plays the timer interrupt. It sleeps until absolute
//! deadlines (`next += period`) so the firing rate does not drift, and on
//! each deadline runs the sampling handler through [`Timebase::fire`]. The
//! thread is the only writer of the sample buffer.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use adcscan_core::{SampleBuffer, SamplingHandler, ScanConfig, Timebase};
use adcscan_hal::{PeriodicTimer, ScanAdc};
use log::{info, warn};

use crate::error::Result;

#[derive(Default)]
struct TimerLine {
    running: AtomicBool,
    pending: AtomicBool,
    reload: AtomicU32,
    firings: AtomicU32,
    overruns: AtomicU32,
}

/// Register-level view of the simulated timer
///
/// Clones control the same timer.
#[derive(Clone, Default)]
pub struct SimTimer {
    line: Arc<TimerLine>,
}

impl SimTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the interrupt; counts an overrun if the last one was never cleared
    fn raise(&self) {
        if self.line.pending.swap(true, Ordering::AcqRel) {
            self.line.overruns.fetch_add(1, Ordering::Relaxed);
        }
        self.line.firings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reload(&self) -> u32 {
        self.line.reload.load(Ordering::Relaxed)
    }

    pub fn is_pending(&self) -> bool {
        self.line.pending.load(Ordering::Acquire)
    }
}

impl PeriodicTimer for SimTimer {
    type Error = Infallible;

    fn configure_periodic(&mut self, period_ticks: u32) -> core::result::Result<(), Self::Error> {
        self.line.reload.store(period_ticks, Ordering::Relaxed);
        Ok(())
    }

    fn start(&mut self) {
        self.line.running.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        self.line.running.store(false, Ordering::Release);
    }

    fn clear_pending(&mut self) {
        self.line.pending.store(false, Ordering::Release);
    }

    fn is_running(&self) -> bool {
        self.line.running.load(Ordering::Acquire)
    }
}

/// Periodic "interrupt" thread driving the sampling handler
pub struct ThreadTimebase {
    timer: SimTimer,
    period: Duration,
    thread: Option<JoinHandle<()>>,
}

impl ThreadTimebase {
    /// Validate `config`, prime the first conversion and start firing
    pub fn start<A, const N: usize>(
        shared: Arc<SampleBuffer<N>>,
        mut adc: A,
        config: &ScanConfig,
    ) -> Result<Self>
    where
        A: ScanAdc + Send + 'static,
    {
        let reload = config.validate()?;
        let period = Duration::from_micros(u64::from(reload) * u64::from(config.timebase.tick_us));
        let policy = config.policy;

        SamplingHandler::new(&shared, policy).prime(&mut adc);

        let timer = SimTimer::new();
        let mut timebase = Timebase::start(timer.clone(), &config.timebase)?;
        let line = timer.clone();

        let spawned = thread::Builder::new()
            .name("adcscan-timer".into())
            .spawn(move || {
                let mut handler = SamplingHandler::new(&shared, policy);
                let mut next = Instant::now();

                while line.is_running() {
                    next += period;
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    if !line.is_running() {
                        break;
                    }
                    line.raise();
                    timebase.fire(&mut handler, &mut adc);
                }
            });

        let thread = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                timer.clone().stop();
                return Err(err.into());
            }
        };

        info!("timebase started: {:?} period ({} timer ticks)", period, reload);
        Ok(Self {
            timer,
            period,
            thread: Some(thread),
        })
    }

    /// Disable the timer and wait for the firing thread to finish
    ///
    /// Once this returns the sample buffer no longer changes.
    pub fn stop(&mut self) {
        self.timer.stop();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("timer thread panicked");
            }
            info!(
                "timebase stopped after {} firings ({} overruns)",
                self.firings(),
                self.overruns()
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn timer(&self) -> &SimTimer {
        &self.timer
    }

    /// Interrupts raised so far
    pub fn firings(&self) -> u32 {
        self.timer.line.firings.load(Ordering::Relaxed)
    }

    /// Interrupts raised while the previous one was still pending
    pub fn overruns(&self) -> u32 {
        self.timer.line.overruns.load(Ordering::Relaxed)
    }
}

impl Drop for ThreadTimebase {
    fn drop(&mut self) {
        self.stop();
    }
}
