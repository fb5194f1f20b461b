//! MixScribe - mixed system-audio and microphone capture with offline transcription
//!
//! This crate records the audio the system is playing (a loopback source)
//! together with the microphone into one stereo file, by supervising an
//! external FFmpeg capture engine, and hands the file to an offline
//! speech-to-text collaborator.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Device and session value objects, the capture state machine
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (capture engine, audio
//!   servers, whisper CLI, JSON config)
//! - **CLI**: Command-line interface and argument parsing

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
