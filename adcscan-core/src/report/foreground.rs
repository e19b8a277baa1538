//! Foreground reporting loop
//!
//! Polls the shared tick counter, and whenever the report deadline is
//! reached writes one line with the tick and every channel value to the
//! output sink. The loop only ever reads shared state.

use core::fmt;

use adcscan_hal::{OutputPin, UartTx};
use portable_atomic::{AtomicBool, Ordering};

use super::schedule::{ReportSchedule, ScheduleState};
use crate::shared::{SampleBuffer, Snapshot};

/// Cooperative cancellation for [`ForegroundLoop::run`]
pub struct StopFlag {
    stopped: AtomicBool,
}

impl StopFlag {
    pub const fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
        }
    }

    /// Ask the loop to return
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopStats {
    /// Deadlines reached
    pub reports: u32,
    /// Reports cut short by the sink
    pub sink_errors: u32,
}

/// Report output failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError<E> {
    /// Sink failed after `written` bytes of the line; the rest was dropped
    Sink { written: usize, error: E },
}

impl<E: fmt::Debug> fmt::Display for ReportError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sink { written, error } => {
                write!(f, "report sink failed after {} bytes: {:?}", written, error)
            }
        }
    }
}

/// Reader side of a [`SampleBuffer`]
pub struct ForegroundLoop<'a, const N: usize, S: UartTx, P: OutputPin> {
    shared: &'a SampleBuffer<N>,
    schedule: ReportSchedule,
    sink: S,
    load_pin: P,
    stats: LoopStats,
}

impl<'a, const N: usize, S: UartTx, P: OutputPin> ForegroundLoop<'a, N, S, P> {
    /// Create a loop reporting every `interval` ticks, first at tick `interval`
    pub fn new(shared: &'a SampleBuffer<N>, interval: u32, sink: S, load_pin: P) -> Self {
        Self {
            shared,
            schedule: ReportSchedule::new(interval),
            sink,
            load_pin,
            stats: LoopStats::default(),
        }
    }

    /// Poll once
    ///
    /// Returns the reported snapshot if a deadline was reached. The load pin
    /// toggles on every report. A sink error drops the rest of the line but
    /// leaves the schedule alone.
    pub fn step(&mut self) -> Result<Option<Snapshot<N>>, ReportError<S::Error>> {
        if self.schedule.poll(self.shared.tick_count()) == ScheduleState::Waiting {
            return Ok(None);
        }

        let snapshot = self.shared.snapshot();
        self.load_pin.toggle();
        self.stats.reports = self.stats.reports.wrapping_add(1);

        if let Err(err) = self.emit(&snapshot) {
            self.stats.sink_errors = self.stats.sink_errors.wrapping_add(1);
            return Err(err);
        }
        Ok(Some(snapshot))
    }

    /// Busy-poll until `stop` is set
    pub fn run(&mut self, stop: &StopFlag) -> LoopStats {
        while !stop.is_stopped() {
            // sink errors are already counted in stats
            if let Ok(None) = self.step() {
                core::hint::spin_loop();
            }
        }
        self.stats
    }

    fn emit(&mut self, snapshot: &Snapshot<N>) -> Result<(), ReportError<S::Error>> {
        let line = snapshot.render();
        let bytes = line.as_bytes();

        for (written, &byte) in bytes.iter().enumerate() {
            self.sink
                .write_byte(byte)
                .map_err(|error| ReportError::Sink { written, error })?;
        }
        self.sink.flush().map_err(|error| ReportError::Sink {
            written: bytes.len(),
            error,
        })
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn schedule(&self) -> &ReportSchedule {
        &self.schedule
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (S, P) {
        (self.sink, self.load_pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionPolicy;
    use crate::sampler::SamplingHandler;
    use adcscan_hal::ScanAdc;

    /// Collects output; fails every byte while `fail_after` is reached
    #[derive(Default)]
    struct VecSink {
        out: Vec<u8>,
        fail_after: Option<usize>,
    }

    impl UartTx for VecSink {
        type Error = &'static str;

        fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
            if self.fail_after.is_some_and(|limit| self.out.len() >= limit) {
                return Err("tx full");
            }
            self.out.push(byte);
            Ok(())
        }
    }

    #[derive(Default)]
    struct LoadPin {
        high: bool,
        toggles: u32,
    }

    impl OutputPin for LoadPin {
        fn set_high(&mut self) {
            self.high = true;
            self.toggles += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.toggles += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct CountingAdc(u16);

    impl ScanAdc for CountingAdc {
        fn start_conversion(&mut self, _channel: u8) {
            self.0 += 1;
        }

        fn conversion_complete(&self) -> bool {
            true
        }

        fn read_conversion(&mut self) -> u16 {
            self.0
        }
    }

    #[test]
    fn test_waits_for_first_deadline() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        let mut fg = ForegroundLoop::new(&shared, 500, VecSink::default(), LoadPin::default());

        assert_eq!(fg.step(), Ok(None));
        shared.preset_ticks(499);
        assert_eq!(fg.step(), Ok(None));
        assert!(fg.sink_mut().out.is_empty());
    }

    #[test]
    fn test_report_line_and_load_pin() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
        let mut adc = CountingAdc(0);
        let mut fg = ForegroundLoop::new(&shared, 4, VecSink::default(), LoadPin::default());

        handler.prime(&mut adc);
        for _ in 0..4 {
            handler.on_fire(&mut adc);
        }

        let snapshot = fg.step().unwrap().unwrap();
        assert_eq!(snapshot.tick, 4);
        assert_eq!(snapshot.samples, [1, 2, 3, 4]);
        assert_eq!(fg.step(), Ok(None));

        let (sink, pin) = fg.into_parts();
        assert_eq!(
            String::from_utf8(sink.out).unwrap(),
            "  time: 4    AIN0: 1    AIN1: 2    AIN2: 3    AIN3: 4\n"
        );
        assert!(pin.high);
        assert_eq!(pin.toggles, 1);
    }

    #[test]
    fn test_reader_never_mutates_shared_state() {
        let shared: SampleBuffer<2> = SampleBuffer::new();
        shared.store(0, 11);
        shared.store(1, 22);
        shared.preset_ticks(1000);
        let before = shared.snapshot();

        let mut fg = ForegroundLoop::new(&shared, 500, VecSink::default(), LoadPin::default());
        while let Ok(Some(_)) = fg.step() {}

        assert_eq!(shared.snapshot(), before);
        assert_eq!(shared.cursor(), 0);
        assert_eq!(fg.stats().reports, 2);
    }

    #[test]
    fn test_sink_error_drops_rest_of_line() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        let sink = VecSink {
            fail_after: Some(10),
            ..Default::default()
        };
        let mut fg = ForegroundLoop::new(&shared, 500, sink, LoadPin::default());

        shared.preset_ticks(500);
        assert_eq!(
            fg.step(),
            Err(ReportError::Sink {
                written: 10,
                error: "tx full"
            })
        );
        assert_eq!(fg.sink_mut().out, b"  time: 50");
        assert_eq!(
            fg.stats(),
            LoopStats {
                reports: 1,
                sink_errors: 1
            }
        );
        // schedule still advanced
        assert_eq!(fg.schedule().next_deadline(), 1000);
    }

    #[test]
    fn test_sink_recovers_on_next_deadline() {
        let shared: SampleBuffer<1> = SampleBuffer::new();
        let sink = VecSink {
            fail_after: Some(0),
            ..Default::default()
        };
        let mut fg = ForegroundLoop::new(&shared, 100, sink, LoadPin::default());

        shared.preset_ticks(100);
        assert!(fg.step().is_err());

        fg.sink_mut().fail_after = None;
        shared.preset_ticks(200);
        assert_eq!(
            fg.step().map(|s| s.map(|s| s.tick)),
            Ok(Some(200))
        );
        assert_eq!(fg.sink_mut().out, b"  time: 200    AIN0: 0\n");
    }

    #[test]
    fn test_run_returns_when_stopped() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        shared.preset_ticks(1500);
        let stop = StopFlag::new();
        stop.stop();

        let mut fg = ForegroundLoop::new(&shared, 500, VecSink::default(), LoadPin::default());
        let stats = fg.run(&stop);
        assert_eq!(stats, LoopStats::default());
    }

    /// Fails the first byte it is given, then stops `stop` after a full line
    struct FlakySink<'a> {
        out: Vec<u8>,
        failed: bool,
        stop: &'a StopFlag,
    }

    impl UartTx for FlakySink<'_> {
        type Error = &'static str;

        fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
            if !self.failed {
                self.failed = true;
                return Err("tx busy");
            }
            self.out.push(byte);
            if byte == b'\n' {
                self.stop.stop();
            }
            Ok(())
        }
    }

    #[test]
    fn test_run_counts_sink_error_and_carries_on() {
        let shared: SampleBuffer<1> = SampleBuffer::new();
        shared.preset_ticks(200);
        let stop = StopFlag::new();
        let sink = FlakySink {
            out: Vec::new(),
            failed: false,
            stop: &stop,
        };

        let mut fg = ForegroundLoop::new(&shared, 100, sink, LoadPin::default());
        let stats = fg.run(&stop);
        assert_eq!(
            stats,
            LoopStats {
                reports: 2,
                sink_errors: 1
            }
        );
        assert_eq!(fg.schedule().next_deadline(), 300);

        let (sink, pin) = fg.into_parts();
        assert_eq!(sink.out, b"  time: 200    AIN0: 0\n");
        assert_eq!(pin.toggles, 2);
    }

    #[test]
    fn test_stop_flag() {
        let stop = StopFlag::default();
        assert!(!stop.is_stopped());
        stop.stop();
        assert!(stop.is_stopped());
    }
}
