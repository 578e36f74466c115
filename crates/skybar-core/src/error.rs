//! Centralized error types for configuration and bootstrap.
//!
//! Domain errors (weather fetch, geocoding, scheduling) live next to the code
//! that produces them; each follows the same pattern as [`ConfigError`]:
//! a `thiserror` enum with a `user_message()` accessor returning display-ready
//! text, while the `Display` impl keeps the full technical context for logs.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine the platform config directory")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "Could not read or write the config file.",
            ConfigError::Parse(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Serialize(_) => "Failed to save configuration.",
            ConfigError::NoConfigDir => "No config directory available on this system.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}
