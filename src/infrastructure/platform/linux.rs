//! Linux capture platform: PulseAudio/PipeWire source discovery and pulse commands
//!
//! Source names from the audio server are already the identifiers the engine
//! accepts, so resolution is the identity function here. Loopback capture
//! uses a sink's monitor source.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, warn};

use super::hide_window;
use crate::application::ports::CapturePlatform;
use crate::domain::audio::{CHANNELS, LOOPBACK_GAIN, MIC_GAIN, SAMPLE_RATE};
use crate::domain::device::{DeviceDescriptor, DeviceKind, DeviceSelection};
use crate::domain::AppConfig;

/// PulseAudio's literal token for "whatever the default source is".
pub const DEFAULT_SOURCE_TOKEN: &str = "default";

const MONITOR_SUFFIX: &str = ".monitor";

/// Linux capture capability backed by the pulse audio-server protocol
/// (served natively by PulseAudio or by PipeWire's compatibility layer).
pub struct LinuxPlatform {
    engine: PathBuf,
}

impl LinuxPlatform {
    pub fn new(engine: PathBuf) -> Self {
        Self { engine }
    }

    /// Ask the engine to enumerate pulse sources itself. Fallback for hosts
    /// without the `pactl` client tool.
    fn engine_source_listing(&self) -> Option<String> {
        let mut command = Command::new(&self.engine);
        command
            .args(["-sources", "pulse"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        hide_window(&mut command);

        match command.output() {
            Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Err(e) => {
                warn!("engine source introspection failed: {}", e);
                None
            }
        }
    }

    /// Monitor source of the default playback sink, when the server answers.
    fn default_sink_monitor() -> Option<String> {
        let sink = pactl_line(&["get-default-sink"])?;
        if sink.ends_with(MONITOR_SUFFIX) {
            Some(sink)
        } else {
            Some(format!("{}{}", sink, MONITOR_SUFFIX))
        }
    }

    fn default_source() -> Option<String> {
        pactl_line(&["get-default-source"])
    }
}

impl CapturePlatform for LinuxPlatform {
    fn list_devices(&self) -> Vec<DeviceDescriptor> {
        if let Some(listing) = pactl_output(&["list", "sources"]) {
            let sources = parse_pactl_sources(&listing);
            if !sources.is_empty() {
                return sources;
            }
        }
        match self.engine_source_listing() {
            Some(listing) => parse_engine_sources(&listing),
            None => Vec::new(),
        }
    }

    /// Source names are already engine-ready on this platform.
    fn resolve_identifier(&self, friendly_name: &str) -> String {
        friendly_name.to_string()
    }

    fn select_devices(&self, config: &AppConfig) -> DeviceSelection {
        // Persisted configuration always wins over heuristics.
        if config.loopback_device_id.is_some() {
            debug!("using persisted device identifiers");
            return DeviceSelection::new(
                config.loopback_device_id.clone(),
                config.mic_device_id.clone(),
            );
        }

        let sources = self.list_devices();
        choose_devices(
            &sources,
            Self::default_sink_monitor().as_deref(),
            Self::default_source().as_deref(),
        )
    }

    fn build_capture_args(
        &self,
        loopback_id: &str,
        mic_id: Option<&str>,
        output_path: &Path,
    ) -> Vec<String> {
        let output = output_path.to_string_lossy().into_owned();
        let mut args = vec![
            "-f".to_string(),
            "pulse".to_string(),
            "-i".to_string(),
            loopback_id.to_string(),
        ];

        if let Some(mic) = mic_id {
            args.extend([
                "-f".to_string(),
                "pulse".to_string(),
                "-i".to_string(),
                mic.to_string(),
                // normalize=0 keeps the asymmetric gain staging instead of
                // letting amix auto-level it away.
                "-filter_complex".to_string(),
                format!(
                    "[0:a]volume={LOOPBACK_GAIN}[a0];[1:a]volume={MIC_GAIN}[a1];\
                     [a0][a1]amix=inputs=2:duration=longest:normalize=0[out]"
                ),
                "-map".to_string(),
                "[out]".to_string(),
            ]);
        }

        args.extend([
            "-ar".to_string(),
            SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            CHANNELS.to_string(),
            "-y".to_string(),
            output,
        ]);
        args
    }
}

fn pactl_output(args: &[&str]) -> Option<String> {
    let mut command = Command::new("pactl");
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    hide_window(&mut command);

    let output = command.output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn pactl_line(args: &[&str]) -> Option<String> {
    let output = pactl_output(args)?;
    let line = output.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Parse `pactl list sources` output: one record per `Name:`/`Description:`
/// pair inside each source block.
pub(crate) fn parse_pactl_sources(listing: &str) -> Vec<DeviceDescriptor> {
    let mut sources = Vec::new();
    let mut pending_name: Option<String> = None;

    for line in listing.lines() {
        let line = line.trim();
        if let Some(name) = line.strip_prefix("Name:") {
            // A name without a following description is still a usable source.
            if let Some(previous) = pending_name.take() {
                sources.push(source_descriptor(previous, None));
            }
            pending_name = Some(name.trim().to_string());
        } else if let Some(description) = line.strip_prefix("Description:") {
            if let Some(name) = pending_name.take() {
                sources.push(source_descriptor(name, Some(description.trim().to_string())));
            }
        }
    }
    if let Some(name) = pending_name {
        sources.push(source_descriptor(name, None));
    }

    sources
}

/// Parse the engine's own `-sources` introspection, lines shaped like
/// `  alsa_input.usb-... [Built-in Audio] (none)` with `*` marking defaults.
pub(crate) fn parse_engine_sources(listing: &str) -> Vec<DeviceDescriptor> {
    let mut sources: Vec<DeviceDescriptor> = Vec::new();

    for line in listing.lines() {
        let line = line.trim_start_matches('*').trim();
        if line.is_empty() || line.ends_with(':') {
            continue;
        }
        let Some(name) = line.split_whitespace().next() else {
            continue;
        };
        if sources.iter().any(|s| s.raw_identifier == name) {
            continue;
        }

        let description = line
            .find('[')
            .and_then(|start| line[start + 1..].find(']').map(|end| (start, end)))
            .map(|(start, end)| line[start + 1..start + 1 + end].to_string());

        sources.push(source_descriptor(name.to_string(), description));
    }

    sources
}

fn source_descriptor(name: String, description: Option<String>) -> DeviceDescriptor {
    let friendly_name = match description {
        Some(ref description) if description != &name => {
            format!("{} [{}]", description, name)
        }
        _ => name.clone(),
    };
    DeviceDescriptor {
        friendly_name,
        raw_identifier: name,
        kind: DeviceKind::Audio,
    }
}

/// Heuristic loopback/microphone choice over enumerated sources.
///
/// Loopback: the default sink's monitor when enumerated, else the first
/// source named like a monitor, else the literal default token while any
/// sources were seen at all. Microphone: the default source when distinct
/// from the loopback, else the first non-loopback source, else the default
/// token unless the loopback already claimed it.
pub(crate) fn choose_devices(
    sources: &[DeviceDescriptor],
    default_sink_monitor: Option<&str>,
    default_source: Option<&str>,
) -> DeviceSelection {
    let has = |name: &str| sources.iter().any(|s| s.raw_identifier == name);

    let loopback = default_sink_monitor
        .filter(|monitor| has(monitor))
        .map(str::to_string)
        .or_else(|| {
            sources
                .iter()
                .find(|s| s.raw_identifier.contains("monitor"))
                .map(|s| s.raw_identifier.clone())
        })
        .or_else(|| {
            if sources.is_empty() {
                None
            } else {
                Some(DEFAULT_SOURCE_TOKEN.to_string())
            }
        });

    let microphone = default_source
        .filter(|source| Some(*source) != loopback.as_deref())
        .map(str::to_string)
        .or_else(|| {
            sources
                .iter()
                .map(|s| &s.raw_identifier)
                .find(|name| Some(name.as_str()) != loopback.as_deref())
                .cloned()
        })
        .or_else(|| {
            if loopback.as_deref() == Some(DEFAULT_SOURCE_TOKEN) {
                None
            } else {
                Some(DEFAULT_SOURCE_TOKEN.to_string())
            }
        });

    DeviceSelection::new(loopback, microphone)
}
