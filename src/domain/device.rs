//! Audio capture device value objects

use std::fmt;

/// What a discovered endpoint can capture.
///
/// Only `Audio` entries are usable for recording; video kinds show up in the
/// Windows DirectShow listing and are kept so callers can filter explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Audio,
    Video,
    VideoAudio,
}

impl DeviceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::VideoAudio => "video+audio",
        }
    }

    /// Whether this endpoint can feed the capture pipeline at all.
    pub const fn has_audio(&self) -> bool {
        matches!(self, Self::Audio | Self::VideoAudio)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One capture-capable endpoint, normalized across platforms.
///
/// `raw_identifier` is what the capture engine accepts directly: a DirectShow
/// alternative name on Windows, a PulseAudio/PipeWire source name on Linux.
/// Descriptors are re-enumerated fresh on every discovery call and never
/// persisted; only raw identifiers go into the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub friendly_name: String,
    pub raw_identifier: String,
    pub kind: DeviceKind,
}

/// Result of device discovery for one recording attempt.
///
/// A missing loopback is a fatal precondition for starting capture; a missing
/// microphone only degrades the session to single-source mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    pub loopback: Option<String>,
    pub microphone: Option<String>,
}

impl DeviceSelection {
    pub fn new(loopback: Option<String>, microphone: Option<String>) -> Self {
        Self {
            loopback,
            microphone,
        }
    }
}
