//! Simulation runtime
//!
//! Wires the shared buffer, the thread timebase and a foreground loop
//! together the same way the firmware does on the board.

use std::fmt::Debug;
use std::sync::Arc;
use std::thread;

use adcscan_core::{ForegroundLoop, LoopStats, SampleBuffer, ScanConfig, StopFlag};
use adcscan_hal::{OutputPin, ScanAdc, UartTx};
use log::{trace, warn};

use crate::error::Result;
use crate::timebase::ThreadTimebase;

/// A running scan of `N` channels
pub struct ScanRuntime<const N: usize> {
    config: ScanConfig,
    shared: Arc<SampleBuffer<N>>,
    timebase: ThreadTimebase,
}

impl<const N: usize> ScanRuntime<N> {
    /// Start sampling `adc` with `config`
    pub fn start<A>(config: ScanConfig, adc: A) -> Result<Self>
    where
        A: ScanAdc + Send + 'static,
    {
        let shared = Arc::new(SampleBuffer::new());
        let timebase = ThreadTimebase::start(Arc::clone(&shared), adc, &config)?;
        Ok(Self {
            config,
            shared,
            timebase,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn shared(&self) -> &SampleBuffer<N> {
        &self.shared
    }

    pub fn timebase(&self) -> &ThreadTimebase {
        &self.timebase
    }

    /// Foreground loop over this runtime's buffer, using the configured interval
    pub fn foreground<S: UartTx, P: OutputPin>(&self, sink: S, pin: P) -> ForegroundLoop<'_, N, S, P> {
        ForegroundLoop::new(&self.shared, self.config.report_interval_ticks, sink, pin)
    }

    /// Report until `stop` is set, then stop the timebase
    pub fn run_until<S, P>(&mut self, sink: S, pin: P, stop: &StopFlag) -> LoopStats
    where
        S: UartTx,
        S::Error: Debug,
        P: OutputPin,
    {
        let mut fg = self.foreground(sink, pin);
        while !stop.is_stopped() {
            match fg.step() {
                Ok(Some(snapshot)) => trace!("report at tick {}", snapshot.tick),
                Ok(None) => thread::yield_now(),
                Err(err) => warn!("{}", err),
            }
        }
        let stats = fg.stats();
        drop(fg);
        self.stop();
        stats
    }

    /// Stop sampling; the buffer is frozen afterwards
    pub fn stop(&mut self) {
        self.timebase.stop();
    }
}
