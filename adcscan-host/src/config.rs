//! Scan configuration loading
//!
//! Reads a [`ScanConfig`] from TOML. Missing keys fall back to the
//! defaults, and the result is validated before it is handed out.

use std::fs;
use std::path::Path;

use adcscan_core::ScanConfig;
use log::debug;

use crate::error::Result;

/// Configuration used when no file is given
pub const DEFAULT_CONFIG: &str = include_str!("../scan.toml");

/// Parse and validate a configuration
pub fn parse_config(text: &str) -> Result<ScanConfig> {
    let config: ScanConfig = toml::from_str(text)?;
    let reload = config.validate()?;
    debug!(
        "scan config: {}us period ({} timer ticks), report every {} ticks, {:?}",
        config.timebase.period_us, reload, config.report_interval_ticks, config.policy
    );
    Ok(config)
}

/// Load from `path`, or the built-in defaults when `None`
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => {
            debug!("loading scan config from {}", path.display());
            let text = fs::read_to_string(path)?;
            parse_config(&text)
        }
        None => parse_config(DEFAULT_CONFIG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use adcscan_core::{ConfigError, ConversionPolicy, TimebaseConfig};
    use proptest::prelude::*;

    #[test]
    fn test_builtin_config_matches_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config(
            r#"
            policy = "skip_and_retry"

            [timebase]
            tick_us = 1
            max_reload = 4294967295
            "#,
        )
        .unwrap();
        assert_eq!(config.policy, ConversionPolicy::SkipAndRetry);
        assert_eq!(config.timebase.period_us, 1000);
        assert_eq!(config.timebase.reload_ticks(), Ok(1000));
        assert_eq!(config.report_interval_ticks, 500);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = parse_config("[timebase]\ntick_us = 1\n").unwrap_err();
        assert!(matches!(
            err,
            HostError::Config(ConfigError::ReloadOutOfRange { reload: 1000, max: 255 })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_config("report_interval_ticks = \"soon\"").unwrap_err();
        assert!(matches!(err, HostError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/scan.toml"))).unwrap_err();
        assert!(matches!(err, HostError::Io(_)));
    }

    proptest! {
        #[test]
        fn prop_valid_config_survives_toml(
            tick_us in 1u32..=16,
            reload in 1u32..=255,
            headroom in 0u32..1000,
            report_interval_ticks in 1u32..=i32::MAX as u32,
            skip in any::<bool>(),
            baudrate in 1u32..=1_000_000,
        ) {
            let config = ScanConfig {
                timebase: TimebaseConfig {
                    tick_us,
                    period_us: tick_us * reload,
                    max_reload: reload + headroom,
                },
                report_interval_ticks,
                policy: if skip {
                    ConversionPolicy::SkipAndRetry
                } else {
                    ConversionPolicy::ReadStale
                },
                baudrate,
            };

            let text = toml::to_string(&config).unwrap();
            let parsed = parse_config(&text).unwrap();
            prop_assert_eq!(parsed, config);
            prop_assert_eq!(parsed.validate(), Ok(reload));
        }
    }
}
