//! Domain error types

use thiserror::Error;

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Unknown config key: '{0}'. Valid keys are: loopback_device_id, mic_device_id, output_folder, language, whisper_bin, whisper_model")]
    UnknownKey(String),

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
