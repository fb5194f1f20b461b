//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the capture engine, the audio servers, and the
//! offline transcription CLI.

pub mod capture;
pub mod config;
pub mod platform;
pub mod transcription;

// Re-export adapters
pub use capture::{CaptureSession, StopTimeouts};
pub use config::JsonConfigStore;
pub use platform::{
    create_platform, current_platform, default_recordings_dir, locate_capture_engine,
    no_window_flags, LinuxPlatform, Platform, WindowsPlatform,
};
pub use transcription::WhisperCliTranscriber;
