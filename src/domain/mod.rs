//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod device;
pub mod error;
pub mod session;
pub mod transcript;

// Re-export common types
pub use config::AppConfig;
pub use device::{DeviceDescriptor, DeviceKind, DeviceSelection};
pub use error::*;
pub use session::{CaptureLifecycle, CaptureState, InvalidStateTransition, SessionKind};
pub use transcript::{Transcript, TranscriptSegment};
