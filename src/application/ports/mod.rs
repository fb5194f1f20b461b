//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod platform;
pub mod transcriber;

// Re-export common types
pub use config::ConfigStore;
pub use platform::{CaptureError, CapturePlatform};
pub use transcriber::{Transcriber, TranscriptionError};
