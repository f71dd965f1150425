//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NordicTxError, Result};
use crate::shockburst::protocol::{
    ADDRESS_LENGTH_MAX, ADDRESS_LENGTH_MIN, CRC_LENGTH_MAX, CRC_LENGTH_MIN, MAX_PACKET_LENGTH,
};
use crate::transmitter::render::MAX_CHANNEL_COUNT;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub transmitter: TransmitterConfig,

    #[serde(default)]
    pub receiver: ReceiverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Render step and output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransmitterConfig {
    #[serde(default = "default_channel_count")]
    pub channel_count: u8,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_output_buffer_size")]
    pub output_buffer_size: usize,
}

/// Parse path configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_address_length")]
    pub address_length: u8,

    #[serde(default = "default_crc_length")]
    pub crc_length: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_channel_count() -> u8 { 1 }
fn default_tick_interval_ms() -> u64 { 10 }
fn default_output_buffer_size() -> usize { 4096 }

fn default_address_length() -> u8 { 5 }
fn default_crc_length() -> u8 { 2 }

fn default_log_level() -> String { "info".to_string() }

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            channel_count: default_channel_count(),
            tick_interval_ms: default_tick_interval_ms(),
            output_buffer_size: default_output_buffer_size(),
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            address_length: default_address_length(),
            crc_length: default_crc_length(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> NordicTxError {
    NordicTxError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nordic_tx::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let transmitter = &self.transmitter;

        if transmitter.channel_count == 0 || transmitter.channel_count > MAX_CHANNEL_COUNT {
            return Err(invalid(format!("channel_count must be between 1 and {}", MAX_CHANNEL_COUNT)));
        }

        if transmitter.tick_interval_ms == 0 || transmitter.tick_interval_ms > 60000 {
            return Err(invalid("tick_interval_ms must be between 1 and 60000"));
        }

        // Target channel receives the packet, a gap, and the duplicate
        if transmitter.output_buffer_size < 3 * MAX_PACKET_LENGTH {
            return Err(invalid(format!(
                "output_buffer_size must be at least {} bytes (3 x largest packet)",
                3 * MAX_PACKET_LENGTH
            )));
        }

        if !(ADDRESS_LENGTH_MIN..=ADDRESS_LENGTH_MAX).contains(&self.receiver.address_length) {
            return Err(invalid(format!(
                "address_length must be between {} and {}",
                ADDRESS_LENGTH_MIN, ADDRESS_LENGTH_MAX
            )));
        }

        if !(CRC_LENGTH_MIN..=CRC_LENGTH_MAX).contains(&self.receiver.crc_length) {
            return Err(invalid("crc_length must be 1 or 2"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}
