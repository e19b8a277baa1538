//! Sampling handler
//!
//! Runs once per timer firing, in interrupt context. Each firing collects
//! the conversion started by the previous firing, stores it in the slot of
//! the channel under the cursor, moves the cursor on and starts the next
//! conversion. With N channels every slot is refreshed once every N
//! firings. There is no error path: whatever happens, the handler returns
//! with the tick counter bumped and the timer ready to fire again.

use adcscan_hal::ScanAdc;

use crate::config::ConversionPolicy;
use crate::shared::SampleBuffer;

/// What one firing did to the result buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FireOutcome {
    /// A value was stored for `channel`
    Stored { channel: u8, value: u16 },
    /// The conversion for `channel` was still running and was left alone
    Skipped { channel: u8 },
}

/// The interrupt-side writer of a [`SampleBuffer`]
pub struct SamplingHandler<'a, const N: usize> {
    shared: &'a SampleBuffer<N>,
    policy: ConversionPolicy,
}

impl<'a, const N: usize> SamplingHandler<'a, N> {
    pub const fn new(shared: &'a SampleBuffer<N>, policy: ConversionPolicy) -> Self {
        Self { shared, policy }
    }

    pub fn policy(&self) -> ConversionPolicy {
        self.policy
    }

    pub fn shared(&self) -> &'a SampleBuffer<N> {
        self.shared
    }

    /// Start the conversion for the current cursor
    ///
    /// Call once before the timer is enabled so the first firing has a
    /// result to collect.
    pub fn prime<A: ScanAdc>(&mut self, adc: &mut A) {
        adc.start_conversion(self.shared.cursor() as u8);
    }

    /// Handle one timer firing
    pub fn on_fire<A: ScanAdc>(&mut self, adc: &mut A) -> FireOutcome {
        let channel = self.shared.cursor();

        let outcome = if self.policy == ConversionPolicy::SkipAndRetry
            && !adc.conversion_complete()
        {
            self.shared.record_skip();
            FireOutcome::Skipped {
                channel: channel as u8,
            }
        } else {
            let value = adc.read_conversion();
            self.shared.store(channel, value);
            let next = self.shared.advance_cursor();
            adc.start_conversion(next as u8);
            FireOutcome::Stored {
                channel: channel as u8,
                value,
            }
        };

        self.shared.tick();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Converter returning `channel * 100 + conversions so far`
    ///
    /// `busy_for` firings after each start the conversion reports incomplete.
    struct MockAdc {
        channel: u8,
        started: u32,
        busy_for: u32,
        busy_left: u32,
    }

    impl MockAdc {
        fn new() -> Self {
            Self {
                channel: 0,
                started: 0,
                busy_for: 0,
                busy_left: 0,
            }
        }

        fn slow(busy_for: u32) -> Self {
            Self {
                busy_for,
                ..Self::new()
            }
        }
    }

    impl ScanAdc for MockAdc {
        fn start_conversion(&mut self, channel: u8) {
            self.channel = channel;
            self.started += 1;
            self.busy_left = self.busy_for;
        }

        fn conversion_complete(&self) -> bool {
            self.busy_left == 0
        }

        fn read_conversion(&mut self) -> u16 {
            self.channel as u16 * 100 + self.started as u16
        }
    }

    impl MockAdc {
        /// Let one firing's worth of time pass
        fn elapse(&mut self) {
            self.busy_left = self.busy_left.saturating_sub(1);
        }
    }

    #[test]
    fn test_prime_starts_first_channel() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
        let mut adc = MockAdc::new();

        handler.prime(&mut adc);
        assert_eq!(adc.channel, 0);
        assert_eq!(adc.started, 1);
        assert_eq!(shared.tick_count(), 0);
    }

    #[test]
    fn test_round_robin_order() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
        let mut adc = MockAdc::new();
        handler.prime(&mut adc);

        let channels: [u8; 6] = core::array::from_fn(|_| match handler.on_fire(&mut adc) {
            FireOutcome::Stored { channel, .. } => channel,
            FireOutcome::Skipped { .. } => panic!("read-stale never skips"),
        });
        assert_eq!(channels, [0, 1, 2, 3, 0, 1]);
        assert_eq!(shared.tick_count(), 6);
        assert_eq!(shared.cursor(), 2);
        assert_eq!(adc.channel, 2);
    }

    #[test]
    fn test_value_lands_in_cursor_slot() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
        let mut adc = MockAdc::new();
        handler.prime(&mut adc);

        for _ in 0..4 {
            handler.on_fire(&mut adc);
        }
        assert_eq!(shared.samples(), [1, 102, 203, 304]);
    }

    #[test]
    fn test_read_stale_stores_busy_result() {
        let shared: SampleBuffer<2> = SampleBuffer::new();
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
        let mut adc = MockAdc::slow(5);
        handler.prime(&mut adc);

        let outcome = handler.on_fire(&mut adc);
        assert_eq!(
            outcome,
            FireOutcome::Stored {
                channel: 0,
                value: 1
            }
        );
        assert_eq!(shared.skipped_count(), 0);
    }

    #[test]
    fn test_skip_and_retry_waits_for_conversion() {
        let shared: SampleBuffer<2> = SampleBuffer::new();
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::SkipAndRetry);
        let mut adc = MockAdc::slow(1);
        handler.prime(&mut adc);

        // still converting
        assert_eq!(handler.on_fire(&mut adc), FireOutcome::Skipped { channel: 0 });
        assert_eq!(shared.cursor(), 0);
        assert_eq!(adc.started, 1);
        assert_eq!(shared.tick_count(), 1);

        adc.elapse();
        assert_eq!(
            handler.on_fire(&mut adc),
            FireOutcome::Stored {
                channel: 0,
                value: 1
            }
        );
        assert_eq!(shared.cursor(), 1);
        assert_eq!(shared.skipped_count(), 1);
        assert_eq!(shared.tick_count(), 2);
    }

    #[test]
    fn test_tick_wraps_at_u32_max() {
        let shared: SampleBuffer<4> = SampleBuffer::new();
        shared.preset_ticks(u32::MAX - 1);
        let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
        let mut adc = MockAdc::new();

        handler.on_fire(&mut adc);
        handler.on_fire(&mut adc);
        handler.on_fire(&mut adc);
        assert_eq!(shared.tick_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_tick_count_matches_firings(initial in any::<u32>(), firings in 0u32..2000) {
            let shared: SampleBuffer<4> = SampleBuffer::new();
            shared.preset_ticks(initial);
            let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
            let mut adc = MockAdc::new();
            handler.prime(&mut adc);

            for _ in 0..firings {
                handler.on_fire(&mut adc);
            }
            prop_assert_eq!(shared.tick_count(), initial.wrapping_add(firings));
        }

        #[test]
        fn prop_every_slot_written_after_n_firings(start in 0usize..4) {
            let shared: SampleBuffer<4> = SampleBuffer::new();
            for _ in 0..start {
                shared.advance_cursor();
            }
            let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
            let mut adc = MockAdc::new();
            handler.prime(&mut adc);

            for _ in 0..4 {
                handler.on_fire(&mut adc);
            }
            for ch in 0..4 {
                prop_assert_eq!(shared.refresh_count(ch), Some(1));
            }
        }

        #[test]
        fn prop_refreshes_are_even(firings in 0u32..5000) {
            let shared: SampleBuffer<4> = SampleBuffer::new();
            let mut handler = SamplingHandler::new(&shared, ConversionPolicy::ReadStale);
            let mut adc = MockAdc::new();
            handler.prime(&mut adc);

            for _ in 0..firings {
                handler.on_fire(&mut adc);
            }
            let expected = firings / 4;
            for ch in 0..4 {
                let count = shared.refresh_count(ch).unwrap_or(0);
                prop_assert!(count == expected || count == expected + 1);
            }
        }

        #[test]
        fn prop_skip_and_retry_never_loses_a_tick(busy in 0u32..4, firings in 0u32..500) {
            let shared: SampleBuffer<3> = SampleBuffer::new();
            let mut handler = SamplingHandler::new(&shared, ConversionPolicy::SkipAndRetry);
            let mut adc = MockAdc::slow(busy);
            handler.prime(&mut adc);

            let mut stored = 0u32;
            for _ in 0..firings {
                if let FireOutcome::Stored { .. } = handler.on_fire(&mut adc) {
                    stored += 1;
                }
                adc.elapse();
            }
            prop_assert_eq!(shared.tick_count(), firings);
            prop_assert_eq!(stored + shared.skipped_count(), firings);
        }
    }
}
