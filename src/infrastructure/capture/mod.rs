//! Capture infrastructure module
//!
//! Owns the external engine process for the duration of one recording.

mod session;

pub use session::{CaptureSession, StopTimeouts};
