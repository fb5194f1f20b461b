//! Capture platform port interface

use std::path::Path;

use thiserror::Error;

use crate::domain::device::{DeviceDescriptor, DeviceSelection};
use crate::domain::session::InvalidStateTransition;
use crate::domain::AppConfig;

/// Capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(
        "Capture engine not found. Install FFmpeg or place its binary in the \
         bundled bin/ directory next to the application."
    )]
    EngineMissing,

    /// Distinguished from all other failures: the caller should point the
    /// user at the OS sound settings (enable Stereo Mix on Windows, a
    /// PulseAudio/PipeWire monitor on Linux) and offer a retry.
    #[error("No system-audio loopback device found")]
    LoopbackNotFound,

    #[error("Capture engine failed to start: {0}")]
    EngineStartFailure(String),

    #[error("Recording produced no usable audio: {0}")]
    EngineOutputInvalid(String),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

/// Port for platform-specific device discovery and command synthesis.
///
/// Exactly one implementation is selected at startup by the platform probe.
/// Methods are synchronous short-lived probes: they share no mutable state,
/// re-enumerate on every call, and are safe to run from a background worker.
///
/// Discovery and resolution are best-effort by policy: enumeration failures
/// degrade to an empty listing and resolution failures degrade to the input
/// name, never to an error. Only session lifecycle operations fail typed.
pub trait CapturePlatform: Send + Sync {
    /// Enumerate capture endpoints. One-shot synchronous probe, fresh each
    /// call; returns an empty vec on any enumeration failure.
    fn list_devices(&self) -> Vec<DeviceDescriptor>;

    /// Resolve a friendly name to the identifier the engine accepts.
    /// Identity on Linux; the DirectShow fallback chain on Windows.
    fn resolve_identifier(&self, friendly_name: &str) -> String;

    /// Choose the loopback and microphone for one recording attempt.
    /// Persisted identifiers always win over heuristics.
    fn select_devices(&self, config: &AppConfig) -> DeviceSelection;

    /// Build the engine argument vector for single- or dual-source capture.
    fn build_capture_args(
        &self,
        loopback_id: &str,
        mic_id: Option<&str>,
        output_path: &Path,
    ) -> Vec<String>;
}
