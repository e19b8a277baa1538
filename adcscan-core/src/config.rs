//! Scan configuration
//!
//! Everything here is resolved before the timer is enabled. A value that
//! fails [`ScanConfig::validate`] is a startup-time fatal condition.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of analog channels in one scan
pub const MAX_CHANNELS: usize = 8;

/// Default report interval (firings between two report lines)
pub const DEFAULT_REPORT_INTERVAL_TICKS: u32 = 500;

/// Default UART baud rate for the report output
pub const DEFAULT_BAUDRATE: u32 = 19_200;

/// Longest report interval the wrapping deadline comparison can handle
pub const MAX_REPORT_INTERVAL_TICKS: u32 = i32::MAX as u32;

/// What the handler does when a conversion is still running at firing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConversionPolicy {
    /// Store whatever the data register holds and move on
    ///
    /// Never stalls the scan. The stored value may be the previous
    /// channel's result if the converter is slower than the timer.
    #[default]
    ReadStale,
    /// Leave the slot alone and check the same channel on the next firing
    ///
    /// Stored values are always complete conversions of the right channel,
    /// at the cost of refreshing that channel later.
    SkipAndRetry,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Timer tick length is zero
    ZeroTick,
    /// Firing period is zero
    ZeroPeriod,
    /// Period is not a whole number of timer ticks
    PeriodNotMultipleOfTick { period_us: u32, tick_us: u32 },
    /// Period needs a larger reload value than the timer supports
    ReloadOutOfRange { reload: u32, max: u32 },
    /// Report interval is zero
    ZeroReportInterval,
    /// Report interval exceeds half the tick counter range
    ReportIntervalTooLong,
    /// Baud rate is zero
    ZeroBaudrate,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTick => write!(f, "timer tick must be non-zero"),
            Self::ZeroPeriod => write!(f, "timer period must be non-zero"),
            Self::PeriodNotMultipleOfTick { period_us, tick_us } => write!(
                f,
                "period of {}us is not a multiple of the {}us timer tick",
                period_us, tick_us
            ),
            Self::ReloadOutOfRange { reload, max } => {
                write!(f, "reload value {} exceeds timer maximum {}", reload, max)
            }
            Self::ZeroReportInterval => write!(f, "report interval must be non-zero"),
            Self::ReportIntervalTooLong => write!(
                f,
                "report interval must not exceed {} ticks",
                MAX_REPORT_INTERVAL_TICKS
            ),
            Self::ZeroBaudrate => write!(f, "baud rate must be non-zero"),
        }
    }
}

/// Hardware timebase configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimebaseConfig {
    /// Length of one timer count in microseconds (clock / prescaler)
    pub tick_us: u32,
    /// Interrupt period in microseconds
    pub period_us: u32,
    /// Largest reload value the timer accepts
    pub max_reload: u32,
}

impl Default for TimebaseConfig {
    /// 8-bit timer at 16 MHz / 128, firing every millisecond
    fn default() -> Self {
        Self {
            tick_us: 8,
            period_us: 1000,
            max_reload: u8::MAX as u32,
        }
    }
}

impl TimebaseConfig {
    /// Compute the reload value for the configured period
    pub fn reload_ticks(&self) -> Result<u32, ConfigError> {
        if self.tick_us == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.period_us == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.period_us % self.tick_us != 0 {
            return Err(ConfigError::PeriodNotMultipleOfTick {
                period_us: self.period_us,
                tick_us: self.tick_us,
            });
        }

        let reload = self.period_us / self.tick_us;
        if reload > self.max_reload {
            return Err(ConfigError::ReloadOutOfRange {
                reload,
                max: self.max_reload,
            });
        }
        Ok(reload)
    }

    /// Number of firings in `ms` milliseconds, rounded down
    pub fn firings_in_ms(&self, ms: u32) -> u32 {
        if self.period_us == 0 {
            return 0;
        }
        (ms as u64 * 1000 / self.period_us as u64).min(u32::MAX as u64) as u32
    }
}

/// Complete scan configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanConfig {
    /// Timer setup
    pub timebase: TimebaseConfig,
    /// Firings between two reports
    pub report_interval_ticks: u32,
    /// Handling of conversions still running at firing time
    pub policy: ConversionPolicy,
    /// Report UART baud rate
    pub baudrate: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timebase: TimebaseConfig::default(),
            report_interval_ticks: DEFAULT_REPORT_INTERVAL_TICKS,
            policy: ConversionPolicy::default(),
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}

impl ScanConfig {
    /// Check the whole configuration
    ///
    /// Returns the timer reload value on success.
    pub fn validate(&self) -> Result<u32, ConfigError> {
        let reload = self.timebase.reload_ticks()?;

        if self.report_interval_ticks == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        if self.report_interval_ticks > MAX_REPORT_INTERVAL_TICKS {
            return Err(ConfigError::ReportIntervalTooLong);
        }
        if self.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }

        Ok(reload)
    }
}
