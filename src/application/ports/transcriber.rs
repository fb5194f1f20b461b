//! Transcription port interface
//!
//! The speech-to-text engine is an external collaborator: given a path to a
//! valid audio file, produce a transcript with timestamps. Nothing else about
//! it is assumed here.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Transcript;

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Transcription engine not available: {0}")]
    EngineUnavailable(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Port for offline speech-to-text transcription
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio_path`.
    ///
    /// # Returns
    /// The timestamped transcript or an error
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscriptionError>;
}
