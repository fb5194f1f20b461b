//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MixScribe - record mixed system-audio and microphone, transcribe offline
#[derive(Parser, Debug)]
#[command(name = "mixscribe")]
#[command(version = "0.4.0")]
#[command(about = "Capture system audio and microphone into one file, then transcribe it offline")]
#[command(long_about = None)]
pub struct Cli {
    /// Recording base folder (overrides config)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_folder: Option<String>,

    /// Loopback device identifier (overrides config and auto-detection)
    #[arg(long, value_name = "ID")]
    pub loopback_device: Option<String>,

    /// Microphone device identifier (overrides config and auto-detection)
    #[arg(long, value_name = "ID")]
    pub mic_device: Option<String>,

    /// Skip transcription after recording stops
    #[arg(long)]
    pub no_transcribe: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available capture devices
    Devices,
    /// Transcribe an existing audio file
    Import {
        /// Audio file to import
        file: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value (empty value resets to auto-detect)
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_is_record_mode() {
        let cli = Cli::parse_from(["mixscribe"]);
        assert!(cli.command.is_none());
        assert!(!cli.no_transcribe);
    }

    #[test]
    fn device_overrides_parse() {
        let cli = Cli::parse_from([
            "mixscribe",
            "--loopback-device",
            "sink.monitor",
            "--mic-device",
            "mic_in",
            "--no-transcribe",
        ]);
        assert_eq!(cli.loopback_device.as_deref(), Some("sink.monitor"));
        assert_eq!(cli.mic_device.as_deref(), Some("mic_in"));
        assert!(cli.no_transcribe);
    }
}
