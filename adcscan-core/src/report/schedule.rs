//! Additive report deadline
//!
//! The deadline always moves by a fixed increment from its previous value,
//! never from the tick at which the report actually ran. A late poll
//! therefore does not shift later reports. If the foreground fell behind
//! by more than one interval, consecutive polls report back to back until
//! the deadline has caught up.

/// Whether the current poll is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleState {
    /// Tick counter has not reached the deadline
    Waiting,
    /// Deadline reached; emit one report
    Reporting,
}

/// Deadline tracker for the foreground loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportSchedule {
    interval: u32,
    next_deadline: u32,
}

impl ReportSchedule {
    /// Start waiting for the first deadline, one interval from tick 0
    ///
    /// `interval` must be in `1..=i32::MAX`; larger values break the
    /// wrapping comparison.
    pub const fn new(interval: u32) -> Self {
        Self {
            interval,
            next_deadline: interval,
        }
    }

    /// Start with the first deadline one interval after `now`
    pub const fn starting_at(now: u32, interval: u32) -> Self {
        Self {
            interval,
            next_deadline: now.wrapping_add(interval),
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn next_deadline(&self) -> u32 {
        self.next_deadline
    }

    /// Check `now` against the deadline
    ///
    /// Returns [`ScheduleState::Reporting`] at most once per deadline and
    /// advances the deadline by one interval when it does.
    pub fn poll(&mut self, now: u32) -> ScheduleState {
        // Wrap-safe "now >= deadline"
        if (now.wrapping_sub(self.next_deadline) as i32) >= 0 {
            self.next_deadline = self.next_deadline.wrapping_add(self.interval);
            ScheduleState::Reporting
        } else {
            ScheduleState::Waiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state_waits() {
        let mut schedule = ReportSchedule::new(500);
        assert_eq!(schedule.poll(0), ScheduleState::Waiting);
        assert_eq!(schedule.poll(499), ScheduleState::Waiting);
        assert_eq!(schedule.next_deadline(), 500);
    }

    #[test]
    fn test_reports_once_per_deadline() {
        let mut schedule = ReportSchedule::new(500);
        assert_eq!(schedule.poll(500), ScheduleState::Reporting);
        assert_eq!(schedule.poll(500), ScheduleState::Waiting);
        assert_eq!(schedule.poll(501), ScheduleState::Waiting);
        assert_eq!(schedule.next_deadline(), 1000);
    }

    #[test]
    fn test_late_poll_does_not_drift() {
        let mut schedule = ReportSchedule::new(500);
        // foreground was busy until tick 730
        assert_eq!(schedule.poll(730), ScheduleState::Reporting);
        assert_eq!(schedule.next_deadline(), 1000);
    }

    #[test]
    fn test_catch_up_after_stall() {
        let mut schedule = ReportSchedule::new(500);
        assert_eq!(schedule.poll(1600), ScheduleState::Reporting);
        assert_eq!(schedule.poll(1600), ScheduleState::Reporting);
        assert_eq!(schedule.poll(1600), ScheduleState::Reporting);
        assert_eq!(schedule.poll(1600), ScheduleState::Waiting);
        assert_eq!(schedule.next_deadline(), 2000);
    }

    #[test]
    fn test_deadline_across_wrap() {
        let mut schedule = ReportSchedule::starting_at(u32::MAX - 100, 500);
        assert_eq!(schedule.next_deadline(), 399);
        assert_eq!(schedule.poll(u32::MAX), ScheduleState::Waiting);
        assert_eq!(schedule.poll(398), ScheduleState::Waiting);
        assert_eq!(schedule.poll(399), ScheduleState::Reporting);
    }

    proptest! {
        #[test]
        fn prop_deadlines_are_multiples_of_interval(interval in 1u32..1000, ticks in 0u32..20_000) {
            let mut schedule = ReportSchedule::new(interval);
            let mut fired = 0u32;
            for now in 0..=ticks {
                if schedule.poll(now) == ScheduleState::Reporting {
                    fired += 1;
                    prop_assert_eq!(now, fired * interval);
                }
            }
            prop_assert_eq!(fired, ticks / interval);
        }

        #[test]
        fn prop_sparse_polls_never_lose_a_report(step in 1u32..2000, polls in 1usize..200) {
            let interval = 500;
            let mut schedule = ReportSchedule::new(interval);
            let mut fired = 0u32;
            let mut now = 0u32;
            for _ in 0..polls {
                now += step;
                while schedule.poll(now) == ScheduleState::Reporting {
                    fired += 1;
                }
            }
            prop_assert_eq!(fired, now / interval);
        }
    }

    #[test]
    fn test_reports_at_500_and_1000_only() {
        let mut schedule = ReportSchedule::new(500);
        let reports: Vec<u32> = (0..=1000)
            .filter(|&now| schedule.poll(now) == ScheduleState::Reporting)
            .collect();
        assert_eq!(reports, [500, 1000]);
    }
}
