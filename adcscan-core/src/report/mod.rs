//! Foreground reporting
//!
//! Turns the shared sample buffer into human-readable report lines at a
//! coarse, drift-free interval counted in timer ticks.

pub mod foreground;
pub mod line;
pub mod schedule;

pub use foreground::{ForegroundLoop, LoopStats, ReportError, StopFlag};
pub use line::{ReportLine, REPORT_LINE_CAPACITY};
pub use schedule::{ReportSchedule, ScheduleState};
