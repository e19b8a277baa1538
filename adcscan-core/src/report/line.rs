//! Report line format
//!
//! ```text
//!   time: 500    AIN0: 812    AIN1: 0    AIN2: 4095    AIN3: 17
//! ```
//!
//! Two spaces, `time: <tick>`, two spaces, then per channel two spaces and
//! `AIN<i>: <value>`, channels separated by two spaces, newline at the end.

use core::fmt::{self, Write};

use heapless::String;

use crate::shared::Snapshot;

/// Longest possible line for [`crate::MAX_CHANNELS`] channels, with headroom
pub const REPORT_LINE_CAPACITY: usize = 160;

/// One formatted report line
pub type ReportLine = String<REPORT_LINE_CAPACITY>;

impl<const N: usize> fmt::Display for Snapshot<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  time: {}  ", self.tick)?;
        for (ch, value) in self.samples.iter().enumerate() {
            if ch > 0 {
                f.write_str("  ")?;
            }
            write!(f, "  AIN{}: {}", ch, value)?;
        }
        f.write_str("\n")
    }
}

impl<const N: usize> Snapshot<N> {
    /// Format into a fixed-capacity buffer
    pub fn render(&self) -> ReportLine {
        let mut line = ReportLine::new();
        // Cannot overflow: N <= MAX_CHANNELS and every field is bounded
        let _ = write!(line, "{}", self);
        line
    }
}
