//! Fixed audio pipeline constants
//!
//! Shared by every capture-command variant; only the input/filter stage
//! differs between platforms.

/// Target sample rate for the recorded file (speech-grade fidelity).
pub const SAMPLE_RATE: u32 = 48_000;

/// Output channel count; capture is always forced to stereo.
pub const CHANNELS: u32 = 2;

/// Gain applied to the loopback input in dual-source mode.
///
/// Empirically tuned together with [`MIC_GAIN`]: system audio is slightly
/// attenuated and the microphone boosted because mics are typically quieter.
/// Tuned values, do not re-derive.
pub const LOOPBACK_GAIN: f32 = 0.9;

/// Gain applied to the microphone input in dual-source mode.
pub const MIC_GAIN: f32 = 1.2;

/// File name of the output container inside the session folder.
pub const OUTPUT_FILE_NAME: &str = "audio.wav";
