//! Transcription adapters

mod whisper_cli;

pub use whisper_cli::WhisperCliTranscriber;
