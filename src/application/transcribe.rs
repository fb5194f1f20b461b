//! Transcribe audio file use case
//!
//! Hands a recorded (or imported) audio file to the transcription
//! collaborator and writes a timestamped report next to it.

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tokio::fs;

use crate::domain::session::SessionKind;
use crate::domain::transcript::format_timestamp;

use super::ports::{Transcriber, TranscriptionError};

/// Errors from the transcribe use case
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Failed to write transcript report: {0}")]
    ReportWrite(String),
}

/// Output from the transcribe use case
#[derive(Debug, Clone)]
pub struct TranscribeOutput {
    /// Path to the written transcript report
    pub report_path: PathBuf,
    /// Number of transcript segments
    pub segment_count: usize,
}

/// Transcribe-and-report use case
pub struct TranscribeAudioUseCase<T: Transcriber> {
    transcriber: T,
}

impl<T: Transcriber> TranscribeAudioUseCase<T> {
    pub fn new(transcriber: T) -> Self {
        Self { transcriber }
    }

    /// Transcribe `audio_path` and write `{stem}.txt` beside it.
    pub async fn execute(
        &self,
        audio_path: &Path,
        kind: SessionKind,
    ) -> Result<TranscribeOutput, TranscribeError> {
        let transcript = self.transcriber.transcribe(audio_path).await?;

        let report_path = audio_path.with_extension("txt");
        let report = render_report(audio_path, kind, &transcript.segments);

        fs::write(&report_path, report)
            .await
            .map_err(|e| TranscribeError::ReportWrite(e.to_string()))?;

        Ok(TranscribeOutput {
            report_path,
            segment_count: transcript.segments.len(),
        })
    }
}

fn render_report(
    audio_path: &Path,
    kind: SessionKind,
    segments: &[crate::domain::TranscriptSegment],
) -> String {
    let header = match kind {
        SessionKind::Live => "MIXSCRIBE LIVE REPORT",
        SessionKind::Import => "MIXSCRIBE IMPORT REPORT",
    };
    let file_name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    out.push_str(&format!("Date: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("File: {}\n", file_name));
    out.push_str(&"-".repeat(40));
    out.push_str("\n\n");

    for segment in segments {
        out.push_str(&format!(
            "[{}] {}\n",
            format_timestamp(segment.start_secs),
            segment.text
        ));
    }

    out
}
