//! State shared between the sampling interrupt and the foreground loop
//!
//! Single writer (the sampling handler), any number of readers. Every field
//! is one atomic word, so a reader sees either the old or the new value of a
//! slot, never a mix. There is no cross-slot consistency: a snapshot may
//! combine values from different firings.

use portable_atomic::{AtomicU16, AtomicU32, AtomicUsize, Ordering};

use crate::config::MAX_CHANNELS;

/// Tick counter plus one result slot per channel
pub struct SampleBuffer<const N: usize> {
    ticks: AtomicU32,
    results: [AtomicU16; N],
    refreshes: [AtomicU32; N],
    cursor: AtomicUsize,
    skipped: AtomicU32,
}

/// Tick counter and channel values read at (roughly) the same moment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot<const N: usize> {
    pub tick: u32,
    pub samples: [u16; N],
}

impl<const N: usize> SampleBuffer<N> {
    const CHANNELS_OK: () = assert!(
        N > 0 && N <= MAX_CHANNELS,
        "channel count must be between 1 and MAX_CHANNELS"
    );

    /// Create a zeroed buffer
    ///
    /// `const` so the firmware can place it in a `static`.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CHANNELS_OK;

        Self {
            ticks: AtomicU32::new(0),
            results: [const { AtomicU16::new(0) }; N],
            refreshes: [const { AtomicU32::new(0) }; N],
            cursor: AtomicUsize::new(0),
            skipped: AtomicU32::new(0),
        }
    }

    /// Number of channels in the scan
    pub const fn channels(&self) -> usize {
        N
    }

    /// Current tick count
    pub fn tick_count(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Latest value of one channel
    pub fn sample(&self, channel: usize) -> Option<u16> {
        self.results
            .get(channel)
            .map(|slot| slot.load(Ordering::Acquire))
    }

    /// Latest value of every channel
    pub fn samples(&self) -> [u16; N] {
        core::array::from_fn(|ch| self.results[ch].load(Ordering::Acquire))
    }

    /// Read the tick counter, then every channel
    pub fn snapshot(&self) -> Snapshot<N> {
        let tick = self.tick_count();
        Snapshot {
            tick,
            samples: self.samples(),
        }
    }

    /// How often a channel has been stored
    pub fn refresh_count(&self, channel: usize) -> Option<u32> {
        self.refreshes
            .get(channel)
            .map(|count| count.load(Ordering::Relaxed))
    }

    /// Firings that left the buffer untouched because the conversion was busy
    pub fn skipped_count(&self) -> u32 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Channel currently converting
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub(crate) fn store(&self, channel: usize, value: u16) {
        if let (Some(slot), Some(count)) = (self.results.get(channel), self.refreshes.get(channel))
        {
            slot.store(value, Ordering::Release);
            count.store(count.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
        }
    }

    /// Advance the cursor and return the new channel
    pub(crate) fn advance_cursor(&self) -> usize {
        let next = (self.cursor.load(Ordering::Relaxed) + 1) % N;
        self.cursor.store(next, Ordering::Release);
        next
    }

    pub(crate) fn record_skip(&self) {
        let skipped = self.skipped.load(Ordering::Relaxed);
        self.skipped.store(skipped.wrapping_add(1), Ordering::Relaxed);
    }

    /// Bump the tick counter, wrapping on overflow
    pub(crate) fn tick(&self) -> u32 {
        self.ticks.fetch_add(1, Ordering::Release).wrapping_add(1)
    }

    #[cfg(test)]
    pub(crate) fn preset_ticks(&self, ticks: u32) {
        self.ticks.store(ticks, Ordering::Release);
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buffer: SampleBuffer<4> = SampleBuffer::new();
        assert_eq!(buffer.channels(), 4);
        assert_eq!(buffer.snapshot(), Snapshot { tick: 0, samples: [0; 4] });
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.skipped_count(), 0);
        assert_eq!(buffer.refresh_count(3), Some(0));
    }

    #[test]
    fn test_out_of_range_channel() {
        let buffer: SampleBuffer<2> = SampleBuffer::new();
        buffer.store(2, 99);
        assert_eq!(buffer.sample(2), None);
        assert_eq!(buffer.refresh_count(2), None);
        assert_eq!(buffer.samples(), [0, 0]);
    }

    #[test]
    fn test_store_and_refresh_count() {
        let buffer: SampleBuffer<4> = SampleBuffer::new();
        buffer.store(1, 512);
        buffer.store(1, 513);
        assert_eq!(buffer.sample(1), Some(513));
        assert_eq!(buffer.refresh_count(1), Some(2));
        assert_eq!(buffer.refresh_count(0), Some(0));
    }

    #[test]
    fn test_cursor_wraps() {
        let buffer: SampleBuffer<3> = SampleBuffer::new();
        assert_eq!(buffer.advance_cursor(), 1);
        assert_eq!(buffer.advance_cursor(), 2);
        assert_eq!(buffer.advance_cursor(), 0);
    }

    #[test]
    fn test_tick_wraps() {
        let buffer: SampleBuffer<1> = SampleBuffer::new();
        buffer.preset_ticks(u32::MAX);
        assert_eq!(buffer.tick(), 0);
        assert_eq!(buffer.tick_count(), 0);
    }

    #[test]
    fn test_static_placement() {
        static BUFFER: SampleBuffer<4> = SampleBuffer::new();
        BUFFER.store(0, 7);
        assert_eq!(BUFFER.sample(0), Some(7));
    }
}
