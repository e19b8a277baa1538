//! Build script for adcscan-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates scan.toml at compile time
//! - Turns scan.toml into constants for the firmware

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reports must fit in half the 32-bit tick counter range
const MAX_REPORT_INTERVAL: i64 = i32::MAX as i64;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated scan.toml values
struct ScanToml {
    period_us: u32,
    report_interval_ticks: u32,
    skip_and_retry: bool,
    baudrate: u32,
}

/// Validate scan.toml at compile time
fn validate_config() -> ScanToml {
    // Re-run if scan.toml changes
    println!("cargo:rerun-if-changed=scan.toml");

    let config_path = Path::new("scan.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: scan.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a scan.toml configuration file.           ║\n\
            ║  Please create one in the adcscan-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read scan.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in scan.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let period_us = read_integer(&config, "period_us", 1000, 1, u32::MAX as i64, &mut errors);
    let report_interval_ticks = read_integer(
        &config,
        "report_interval_ticks",
        500,
        1,
        MAX_REPORT_INTERVAL,
        &mut errors,
    );
    let baudrate = read_integer(&config, "baudrate", 19_200, 1, 7_812_500, &mut errors);

    let skip_and_retry = match config.get("policy") {
        None => false,
        Some(toml::Value::String(policy)) => match policy.as_str() {
            "read_stale" => false,
            "skip_and_retry" => true,
            other => {
                errors.push(format!(
                    "policy must be 'read_stale' or 'skip_and_retry', not '{}'",
                    other
                ));
                false
            }
        },
        Some(_) => {
            errors.push("policy must be a string".to_string());
            false
        }
    };

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid scan configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=scan.toml validated successfully");

    ScanToml {
        period_us,
        report_interval_ticks,
        skip_and_retry,
        baudrate,
    }
}

/// Read an optional integer key, checking its range
fn read_integer(
    config: &toml::Value,
    key: &str,
    default: u32,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> u32 {
    match config.get(key) {
        None => default,
        Some(toml::Value::Integer(value)) if (min..=max).contains(value) => *value as u32,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("{} must be {}-{}", key, min, max));
            default
        }
        Some(_) => {
            errors.push(format!("{} must be an integer", key));
            default
        }
    }
}

/// Write the validated values as Rust constants
fn generate_constants(config: &ScanToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let policy = if config.skip_and_retry {
        "SkipAndRetry"
    } else {
        "ReadStale"
    };

    let source = format!(
        "/// Sampling interrupt period from scan.toml\n\
         pub const SCAN_PERIOD_US: u32 = {};\n\
         /// Firings between reports from scan.toml\n\
         pub const SCAN_REPORT_INTERVAL_TICKS: u32 = {};\n\
         /// Busy-conversion policy from scan.toml\n\
         pub const SCAN_POLICY: ConversionPolicy = ConversionPolicy::{};\n\
         /// Report UART baud rate from scan.toml\n\
         pub const SCAN_BAUDRATE: u32 = {};\n",
        config.period_us, config.report_interval_ticks, policy, config.baudrate
    );

    fs::write(out_dir.join("scan_config.rs"), source).unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
