//! Whisper CLI transcriber adapter
//!
//! Drives a whisper.cpp-style command-line binary as the offline
//! speech-to-text collaborator and parses its timestamped stdout lines.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::info;
use tokio::process::Command;

use crate::application::ports::{Transcriber, TranscriptionError};
use crate::domain::{AppConfig, Transcript, TranscriptSegment};

const DEFAULT_BINARY: &str = "whisper-cli";

/// Offline transcriber backed by an external whisper CLI process
pub struct WhisperCliTranscriber {
    binary: PathBuf,
    model: Option<PathBuf>,
    language: String,
}

impl WhisperCliTranscriber {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            binary: PathBuf::from(config.whisper_bin.as_deref().unwrap_or(DEFAULT_BINARY)),
            model: config.whisper_model.as_ref().map(PathBuf::from),
            language: map_language(config.language_or_default()).to_string(),
        }
    }

    fn worker_threads() -> usize {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        (cores / 2).max(2)
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscriptionError> {
        let mut command = Command::new(&self.binary);
        if let Some(model) = &self.model {
            command.arg("-m").arg(model);
        }
        command
            .arg("-l")
            .arg(&self.language)
            .arg("-t")
            .arg(Self::worker_threads().to_string())
            .arg("-f")
            .arg(audio_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        info!("transcribing {} with {}", audio_path.display(), self.binary.display());

        let output = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TranscriptionError::EngineUnavailable(format!(
                    "'{}' not found; install whisper.cpp or set whisper_bin",
                    self.binary.display()
                ))
            } else {
                TranscriptionError::TranscriptionFailed(e.to_string())
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::TranscriptionFailed(
                stderr.lines().last().unwrap_or("unknown error").to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Transcript {
            segments: parse_segments(&stdout),
        })
    }
}

/// Map a user-facing locale to the engine's language code.
fn map_language(language: &str) -> &'static str {
    if language.to_lowercase().contains("pt") {
        "pt"
    } else {
        "en"
    }
}

/// Parse `[HH:MM:SS.mmm --> HH:MM:SS.mmm]  text` lines.
pub(crate) fn parse_segments(stdout: &str) -> Vec<TranscriptSegment> {
    stdout
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix('[')?;
            let (range, text) = rest.split_once(']')?;
            let (start, _end) = range.split_once(" --> ")?;
            let start_secs = parse_timestamp(start.trim())?;
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                start_secs,
                text: text.to_string(),
            })
        })
        .collect()
}

fn parse_timestamp(stamp: &str) -> Option<f64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamped_lines() {
        let stdout = "\
[00:00:00.000 --> 00:00:04.200]   Hello there.
[00:00:04.200 --> 00:01:02.500]   Second segment.

whisper_print_timings: total time = 1000 ms
";
        let segments = parse_segments(stdout);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello there.");
        assert_eq!(segments[0].start_secs, 0.0);
        assert!((segments[1].start_secs - 4.2).abs() < 1e-9);
    }

    #[test]
    fn ignores_untimestamped_noise() {
        let segments = parse_segments("loading model...\nsystem_info: n_threads = 4\n");
        assert!(segments.is_empty());
    }

    #[test]
    fn hour_offsets_accumulate() {
        assert_eq!(parse_timestamp("01:02:03.000"), Some(3723.0));
        assert_eq!(parse_timestamp("bogus"), None);
    }

    #[test]
    fn portuguese_locales_map_to_pt() {
        assert_eq!(map_language("pt_BR"), "pt");
        assert_eq!(map_language("PT"), "pt");
        assert_eq!(map_language("en_US"), "en");
        assert_eq!(map_language("de"), "en");
    }
}
