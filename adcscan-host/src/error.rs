//! Host runtime errors

use std::convert::Infallible;
use std::io;

use adcscan_core::{ConfigError, StartupError};
use thiserror::Error;

/// Errors raised while setting up or running the simulation
#[derive(Error, Debug)]
pub enum HostError {
    #[error("invalid scan configuration: {0}")]
    Config(ConfigError),
    #[error("{0}")]
    Startup(StartupError<Infallible>),
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl From<ConfigError> for HostError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StartupError<Infallible>> for HostError {
    fn from(err: StartupError<Infallible>) -> Self {
        match err {
            StartupError::Config(err) => Self::Config(err),
            other => Self::Startup(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
