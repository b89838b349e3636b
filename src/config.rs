//! # Configuration Management
//!
//! Centralized configuration for decoding, the raw socket boundary and logging.
//!
//! The only behavioural knobs of the codec itself are which header kinds are
//! registered, how deep a header chain may go, and what to do with an
//! unknown protocol identifier. Socket and logging sections configure the
//! outer layers.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Security Considerations
//! - The chain depth cap bounds work per packet on hostile input
//! - Receive buffers are capped so a misconfiguration cannot reserve gigabytes

use crate::core::header::HeaderKind;
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Default cap on headers decoded from one packet
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 16;

/// Largest chain depth accepted by validation
pub const MAX_CHAIN_DEPTH_LIMIT: usize = 64;

/// Largest IPv4/IPv6 datagram without jumbograms
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 65_535;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Layered decoding settings
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Raw socket settings
    #[serde(default)]
    pub socket: SocketConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(depth) = std::env::var("RAW_HEADERS_MAX_CHAIN_DEPTH") {
            if let Ok(val) = depth.parse::<usize>() {
                config.decoder.max_chain_depth = val;
            }
        }

        if let Ok(size) = std::env::var("RAW_HEADERS_RECV_BUFFER") {
            if let Ok(val) = size.parse::<usize>() {
                config.socket.recv_buffer_size = val;
            }
        }

        if let Ok(timeout) = std::env::var("RAW_HEADERS_READ_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.socket.read_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(level) = std::env::var("RAW_HEADERS_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                config.logging.log_level = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.decoder.validate());
        errors.extend(self.socket.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// What the layered decoder does when a header names an unregistered protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownProtocolPolicy {
    /// Fail the whole decode with `UnsupportedProtocol`
    #[default]
    Fail,
    /// Stop and hand back the remainder as opaque payload
    TreatAsPayload,
}

/// Layered decoding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecoderConfig {
    /// Maximum headers decoded from one packet before it is rejected
    pub max_chain_depth: usize,

    /// Header kinds to register
    pub header_kinds: Vec<HeaderKind>,

    /// Handling of unregistered protocol identifiers
    #[serde(default)]
    pub unknown_protocol: UnknownProtocolPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            header_kinds: HeaderKind::ALL.to_vec(),
            unknown_protocol: UnknownProtocolPolicy::Fail,
        }
    }
}

impl DecoderConfig {
    /// Validate decoder configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_chain_depth == 0 {
            errors.push("Max chain depth must be greater than 0".to_string());
        } else if self.max_chain_depth > MAX_CHAIN_DEPTH_LIMIT {
            errors.push(format!(
                "Max chain depth too large: {} (maximum: {MAX_CHAIN_DEPTH_LIMIT})",
                self.max_chain_depth
            ));
        }

        if self.header_kinds.is_empty() {
            errors.push("At least one header kind must be registered".to_string());
        }

        for (i, kind) in self.header_kinds.iter().enumerate() {
            if self.header_kinds[..i].contains(kind) {
                errors.push(format!("Header kind listed more than once: {kind}"));
            }
        }

        errors
    }
}

/// Raw socket configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocketConfig {
    /// Size of the buffer each receive reads into
    pub recv_buffer_size: usize,

    /// How long a receive waits before failing with `Timeout`
    #[serde(with = "duration_serde")]
    pub read_timeout: Duration,

    /// TTL / hop limit set on the socket for kernel-built IP headers
    pub hop_limit: u8,

    /// IPv4 only: caller supplies the IP header (IP_HDRINCL)
    pub include_ip_header: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            read_timeout: Duration::from_secs(5),
            hop_limit: 64,
            include_ip_header: false,
        }
    }
}

impl SocketConfig {
    /// Validate socket configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.recv_buffer_size < 64 {
            errors.push("Receive buffer too small (minimum: 64 bytes)".to_string());
        } else if self.recv_buffer_size > 1024 * 1024 {
            errors.push(format!(
                "Receive buffer too large: {} bytes (maximum: 1 MB)",
                self.recv_buffer_size
            ));
        }

        if self.read_timeout.as_millis() < 10 {
            errors.push("Read timeout too short (minimum: 10ms)".to_string());
        } else if self.read_timeout.as_secs() > 300 {
            errors.push("Read timeout too long (maximum: 300s)".to_string());
        }

        if self.hop_limit == 0 {
            errors.push("Hop limit must be greater than 0".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("raw-headers"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Lowercase name used in config files and filter directives
pub(crate) fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::level_name(level).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
