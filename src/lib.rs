//! PhoneDB Miner: a brand-scoped device catalog scraper
//!
//! This crate enumerates the devices of a brand through PhoneDB's paginated
//! search form, fetches each device's detail page, and keeps both stages as
//! JSON collections that can be rebuilt or updated incrementally.

pub mod config;
pub mod miner;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for PhoneDB Miner operations
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Device list unavailable at {path}: {reason}")]
    DeviceListUnavailable { path: PathBuf, reason: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for PhoneDB Miner operations
pub type Result<T> = std::result::Result<T, MinerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::MinerConfig;
pub use state::{DetailRunReport, ListRunReport, StopReason};
pub use storage::{DeviceDetail, DeviceSummary};
