//! Application configuration value object

use serde::{Deserialize, Serialize};

/// Application configuration.
/// All fields are optional to support partial configs and merging; an absent
/// device id means "auto-detect", an absent folder means "default location".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Raw identifier of the persisted loopback device.
    pub loopback_device_id: Option<String>,
    /// Raw identifier of the persisted microphone device.
    pub mic_device_id: Option<String>,
    /// Recording base folder override.
    pub output_folder: Option<String>,
    /// Transcription language hint (e.g. "en", "pt_BR").
    pub language: Option<String>,
    /// Path or name of the offline transcription binary.
    pub whisper_bin: Option<String>,
    /// Path to the transcription model file.
    pub whisper_model: Option<String>,
}

/// Keys accepted by `config set`/`config get`.
pub const CONFIG_KEYS: &[&str] = &[
    "loopback_device_id",
    "mic_device_id",
    "output_folder",
    "language",
    "whisper_bin",
    "whisper_model",
];

impl AppConfig {
    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            loopback_device_id: other.loopback_device_id.or(self.loopback_device_id),
            mic_device_id: other.mic_device_id.or(self.mic_device_id),
            output_folder: other.output_folder.or(self.output_folder),
            language: other.language.or(self.language),
            whisper_bin: other.whisper_bin.or(self.whisper_bin),
            whisper_model: other.whisper_model.or(self.whisper_model),
        }
    }

    /// Get language, or "en" if not set
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }

    /// Get a config value by key, for `config get`
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        match key {
            "loopback_device_id" => Some(self.loopback_device_id.as_deref()),
            "mic_device_id" => Some(self.mic_device_id.as_deref()),
            "output_folder" => Some(self.output_folder.as_deref()),
            "language" => Some(self.language.as_deref()),
            "whisper_bin" => Some(self.whisper_bin.as_deref()),
            "whisper_model" => Some(self.whisper_model.as_deref()),
            _ => None,
        }
    }

    /// Set a config value by key, for `config set`.
    /// Returns false if the key is unknown.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "loopback_device_id" => &mut self.loopback_device_id,
            "mic_device_id" => &mut self.mic_device_id,
            "output_folder" => &mut self.output_folder,
            "language" => &mut self.language,
            "whisper_bin" => &mut self.whisper_bin,
            "whisper_model" => &mut self.whisper_model,
            _ => return false,
        };
        *slot = if value.is_empty() { None } else { Some(value) };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.loopback_device_id.is_none());
        assert!(config.mic_device_id.is_none());
        assert!(config.output_folder.is_none());
        assert!(config.language.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            loopback_device_id: Some("base_loopback".to_string()),
            output_folder: Some("/base".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            loopback_device_id: Some("other_loopback".to_string()),
            output_folder: None, // Should not override
            language: Some("pt_BR".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.loopback_device_id, Some("other_loopback".to_string()));
        assert_eq!(merged.output_folder, Some("/base".to_string())); // Kept from base
        assert_eq!(merged.language, Some("pt_BR".to_string()));
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut config = AppConfig::empty();
        assert!(config.set("mic_device_id", "mic-1".to_string()));
        assert_eq!(config.get("mic_device_id"), Some(Some("mic-1")));
        // Empty value clears the key back to auto-detect.
        assert!(config.set("mic_device_id", String::new()));
        assert_eq!(config.get("mic_device_id"), Some(None));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = AppConfig::empty();
        assert!(!config.set("bogus", "x".to_string()));
        assert_eq!(config.get("bogus"), None);
    }

    #[test]
    fn language_defaults_to_english() {
        assert_eq!(AppConfig::empty().language_or_default(), "en");
    }
}
