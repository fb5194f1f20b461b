//! Windows capture platform: DirectShow device discovery and dshow commands
//!
//! DirectShow friendly names are ambiguous and version-fragile; the stable
//! way to address a device is its "alternative name" (a GUID-style device
//! path). The engine only prints that listing as human-readable diagnostic
//! text, so this module scrapes it behind fixture-tested parsing functions
//! and never lets a parse failure escape as an error.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use cpal::traits::{DeviceTrait, HostTrait};
use log::{debug, info, warn};

use super::hide_window;
use crate::application::ports::CapturePlatform;
use crate::domain::audio::{CHANNELS, LOOPBACK_GAIN, MIC_GAIN, SAMPLE_RATE};
use crate::domain::device::{DeviceDescriptor, DeviceKind, DeviceSelection};
use crate::domain::AppConfig;

/// DirectShow device-class prefix. Identifiers that already carry it are
/// engine-ready and bypass name resolution entirely.
pub const DEVICE_CLASS_PREFIX: &str = "@device_cm_";

/// Names that mark a system-audio capture endpoint, including known
/// Portuguese and Spanish localizations of "Stereo Mix".
const LOOPBACK_KEYWORDS: &[&str] = &[
    "stereo mix",
    "loopback",
    "wave out mix",
    "what u hear",
    "what you hear",
    "mixagem estéreo",
    "mixagem estereo",
    "mixagem",
    "mezcla estéreo",
    "mezcla estereo",
    "mezcla",
];

const MIC_KEYWORDS: &[&str] = &["microphone", "mic", "input"];

/// A native input endpoint as reported by the OS device-query API.
#[derive(Debug, Clone)]
pub(crate) struct InputEndpoint {
    pub name: String,
    pub input_channels: u16,
}

/// Windows capture capability backed by the engine's dshow support.
pub struct WindowsPlatform {
    engine: PathBuf,
}

impl WindowsPlatform {
    pub fn new(engine: PathBuf) -> Self {
        Self { engine }
    }

    /// Run the engine's "list devices" directive and return its diagnostic
    /// stream. The listing is written to stderr, not stdout.
    fn device_listing(&self) -> Option<String> {
        let mut command = Command::new(&self.engine);
        command
            .args(["-f", "dshow", "-list_devices", "true", "-i", "dummy"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        hide_window(&mut command);

        match command.output() {
            Ok(output) => Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            Err(e) => {
                warn!("dshow device listing failed: {}", e);
                None
            }
        }
    }

    /// Query the OS for input-capable endpoints (not the engine's listing).
    fn native_input_endpoints() -> Vec<InputEndpoint> {
        let host = cpal::default_host();
        let devices = match host.input_devices() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("native input device query failed: {}", e);
                return Vec::new();
            }
        };

        devices
            .filter_map(|device| {
                let name = device.name().ok()?;
                let input_channels = device
                    .supported_input_configs()
                    .ok()?
                    .map(|config| config.channels())
                    .max()
                    .unwrap_or(0);
                Some(InputEndpoint {
                    name,
                    input_channels,
                })
            })
            .collect()
    }
}

impl CapturePlatform for WindowsPlatform {
    fn list_devices(&self) -> Vec<DeviceDescriptor> {
        match self.device_listing() {
            Some(listing) => parse_device_listing(&listing),
            None => Vec::new(),
        }
    }

    fn resolve_identifier(&self, friendly_name: &str) -> String {
        if friendly_name.starts_with(DEVICE_CLASS_PREFIX) {
            return friendly_name.to_string();
        }
        let Some(listing) = self.device_listing() else {
            return friendly_name.to_string();
        };
        match resolve_in_listing(&listing, friendly_name) {
            Some(identifier) => {
                info!("resolved '{}' to a device path", friendly_name);
                identifier
            }
            None => {
                warn!(
                    "could not resolve a device path for '{}', using the name as-is",
                    friendly_name
                );
                friendly_name.to_string()
            }
        }
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
        select_from_inputs(&Self::native_input_endpoints())
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
            "dshow".to_string(),
            "-i".to_string(),
            format!("audio={}", loopback_id),
        ];

        if let Some(mic) = mic_id {
            args.extend([
                "-f".to_string(),
                "dshow".to_string(),
                "-i".to_string(),
                format!("audio={}", mic),
                // dshow's direct mix does not normalize levels, so merge the
                // gain-staged inputs first and pan the channel pairs down to
                // stereo in a second step.
                "-filter_complex".to_string(),
                format!(
                    "[0:a]volume={LOOPBACK_GAIN}[a0];[1:a]volume={MIC_GAIN}[a1];\
                     [a0][a1]amerge=inputs=2[merged];\
                     [merged]pan=stereo|c0<c0+c2|c1<c1+c3[out]"
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

/// Parse the engine's dshow device listing.
///
/// A quoted label on a line tagged `(audio)`, `(video)` or `(video, audio)`
/// opens a record; the alternative identifier, when present, is always on the
/// immediately following line, never the same one.
pub(crate) fn parse_device_listing(listing: &str) -> Vec<DeviceDescriptor> {
    let lines: Vec<&str> = listing.lines().collect();
    let mut devices = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(kind) = line_device_kind(line) else {
            continue;
        };
        let Some(friendly_name) = first_quoted(line) else {
            continue;
        };

        let raw_identifier = alternative_name_after(&lines, i)
            .unwrap_or_else(|| friendly_name.clone());

        devices.push(DeviceDescriptor {
            friendly_name,
            raw_identifier,
            kind,
        });
    }

    devices
}

/// Resolve a friendly name against the dshow listing.
///
/// Fallback chain, first match wins: exact quoted match, lowercased 20-char
/// prefix match, lowercased substring match. Each step only resolves when an
/// alternative name follows the matched line. `None` means the caller keeps
/// the original name (the engine fails fast itself on an unusable name).
pub(crate) fn resolve_in_listing(listing: &str, friendly_name: &str) -> Option<String> {
    let lines: Vec<&str> = listing.lines().collect();

    // Exact match
    let quoted = format!("\"{}\"", friendly_name);
    for (i, line) in lines.iter().enumerate() {
        if line.contains(&quoted) && line_has_audio(line) {
            if let Some(alt) = alternative_name_after(&lines, i) {
                return Some(alt);
            }
        }
    }

    // Prefix-fuzzy match on the first 20 characters
    let wanted_prefix = lowercase_prefix(friendly_name);
    for (i, line) in lines.iter().enumerate() {
        if !line_has_audio(line) {
            continue;
        }
        let Some(candidate) = first_quoted(line) else {
            continue;
        };
        if lowercase_prefix(&candidate) == wanted_prefix {
            if let Some(alt) = alternative_name_after(&lines, i) {
                return Some(alt);
            }
        }
    }

    // Substring match
    let wanted = friendly_name.to_lowercase();
    for (i, line) in lines.iter().enumerate() {
        if !line_has_audio(line) {
            continue;
        }
        let Some(candidate) = first_quoted(line) else {
            continue;
        };
        if candidate.to_lowercase().contains(&wanted) {
            if let Some(alt) = alternative_name_after(&lines, i) {
                return Some(alt);
            }
        }
    }

    None
}

/// Heuristic device selection over the native input endpoints.
///
/// The first loopback-keyword match is the loopback; later keyword matches
/// are ignored. Endpoints merely containing "mix" are remembered as a
/// fallback loopback. The microphone is the first endpoint matching a mic
/// keyword without matching any loopback keyword; the chosen loopback is
/// excluded from microphone candidacy.
pub(crate) fn select_from_inputs(inputs: &[InputEndpoint]) -> DeviceSelection {
    let mut loopback: Option<String> = None;
    let mut microphone: Option<String> = None;
    let mut fallback_mix: Option<String> = None;

    for endpoint in inputs {
        let lower = endpoint.name.to_lowercase();

        if LOOPBACK_KEYWORDS.iter().any(|k| lower.contains(k)) {
            if loopback.is_none() {
                info!("found loopback device: {}", endpoint.name);
                loopback = Some(endpoint.name.clone());
            }
            continue;
        }

        if endpoint.input_channels == 0 {
            continue;
        }

        if lower.contains("mix") && fallback_mix.is_none() {
            fallback_mix = Some(endpoint.name.clone());
        }

        if microphone.is_none() && MIC_KEYWORDS.iter().any(|k| lower.contains(k)) {
            info!("found microphone device: {}", endpoint.name);
            microphone = Some(endpoint.name.clone());
        }
    }

    let loopback = match loopback {
        Some(device) => Some(device),
        None => {
            if let Some(ref fallback) = fallback_mix {
                warn!("no exact loopback match, using fallback: {}", fallback);
            } else {
                warn!("no loopback device found");
            }
            fallback_mix
        }
    };

    // A heuristically chosen loopback is never also the microphone.
    if microphone.is_some() && microphone == loopback {
        microphone = None;
    }
    if microphone.is_none() {
        warn!("no microphone device found, capture degrades to single source");
    }

    DeviceSelection::new(loopback, microphone)
}

fn line_device_kind(line: &str) -> Option<DeviceKind> {
    if !line.contains('"') {
        return None;
    }
    if line.contains("(video, audio)") {
        Some(DeviceKind::VideoAudio)
    } else if line.contains("(audio)") {
        Some(DeviceKind::Audio)
    } else if line.contains("(video)") {
        Some(DeviceKind::Video)
    } else {
        None
    }
}

/// Lines eligible for name resolution: audio-capable endpoints only.
fn line_has_audio(line: &str) -> bool {
    line.contains("(audio)") || line.contains("(video, audio)")
}

fn first_quoted(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let rest = &line[start + 1..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// The alternative identifier never appears on the friendly-name line; it is
/// always the immediately following line, hence the two-line lookahead.
fn alternative_name_after(lines: &[&str], index: usize) -> Option<String> {
    let next = lines.get(index + 1)?;
    if !next.contains("Alternative name") {
        return None;
    }
    let payload = next.split("Alternative name").nth(1)?;
    first_quoted(payload)
}

fn lowercase_prefix(name: &str) -> String {
    name.to_lowercase().chars().take(20).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[dshow @ 0000020a4245f440] DirectShow video devices (some may be both video and audio devices)
[dshow @ 0000020a4245f440]  "Integrated Camera" (video)
[dshow @ 0000020a4245f440]    Alternative name "@device_pnp_\\?\usb#vid_04f2&mid_b604#6&b2d4a27&0&0000#{65e8773d-8f56-11d0-a3b9-00a0c9223196}\global"
[dshow @ 0000020a4245f440] DirectShow audio devices
[dshow @ 0000020a4245f440]  "Microphone (Realtek)" (audio)
[dshow @ 0000020a4245f440]    Alternative name "@device_cm_{33D9A762-90C8-11D0-BD43-00A0C911CE86}\wave_{123}"
[dshow @ 0000020a4245f440]  "Stereo Mix (Realtek High Definition Audio)" (audio)
[dshow @ 0000020a4245f440]    Alternative name "@device_cm_{33D9A762-90C8-11D0-BD43-00A0C911CE86}\wave_{456}"
[dshow @ 0000020a4245f440]  "Webcam Combo" (video, audio)
"#;

    #[test]
    fn parses_friendly_and_alternative_names() {
        let devices = parse_device_listing(LISTING);
        assert_eq!(devices.len(), 4);

        let mic = &devices[1];
        assert_eq!(mic.friendly_name, "Microphone (Realtek)");
        assert_eq!(
            mic.raw_identifier,
            "@device_cm_{33D9A762-90C8-11D0-BD43-00A0C911CE86}\\wave_{123}"
        );
        assert_eq!(mic.kind, DeviceKind::Audio);
        assert_eq!(devices[0].kind, DeviceKind::Video);
    }

    #[test]
    fn friendly_name_doubles_as_identifier_without_alternative_line() {
        let devices = parse_device_listing(LISTING);
        let combo = &devices[3];
        assert_eq!(combo.friendly_name, "Webcam Combo");
        assert_eq!(combo.raw_identifier, "Webcam Combo");
        assert_eq!(combo.kind, DeviceKind::VideoAudio);
    }

    #[test]
    fn resolves_exact_match() {
        let resolved = resolve_in_listing(LISTING, "Microphone (Realtek)").unwrap();
        assert!(resolved.starts_with(DEVICE_CLASS_PREFIX));
        assert!(resolved.contains("wave_{123}"));
    }

    #[test]
    fn resolves_prefix_match_when_exact_is_absent() {
        // Same first 20 characters, different tail.
        let resolved =
            resolve_in_listing(LISTING, "Stereo Mix (Realtek HD Audio, rev 2)").unwrap();
        assert!(resolved.contains("wave_{456}"));
    }

    #[test]
    fn resolves_substring_match_as_last_resort() {
        let resolved = resolve_in_listing(LISTING, "Realtek)").unwrap();
        assert!(resolved.contains("wave_{123}"));
    }

    #[test]
    fn unresolvable_name_returns_none() {
        assert_eq!(resolve_in_listing(LISTING, "USB Headset"), None);
    }

    #[test]
    fn video_only_lines_never_resolve() {
        assert_eq!(resolve_in_listing(LISTING, "Integrated Camera"), None);
    }

    fn endpoint(name: &str, channels: u16) -> InputEndpoint {
        InputEndpoint {
            name: name.to_string(),
            input_channels: channels,
        }
    }

    #[test]
    fn selects_keyword_loopback_and_first_mic() {
        let selection = select_from_inputs(&[
            endpoint("Microphone (USB)", 2),
            endpoint("Stereo Mix (Realtek)", 2),
            endpoint("Microphone Array", 2),
        ]);
        assert_eq!(selection.loopback.as_deref(), Some("Stereo Mix (Realtek)"));
        assert_eq!(selection.microphone.as_deref(), Some("Microphone (USB)"));
    }

    #[test]
    fn first_keyword_loopback_wins() {
        let selection = select_from_inputs(&[
            endpoint("Stereo Mix (Realtek)", 2),
            endpoint("Loopback Capture", 2),
        ]);
        assert_eq!(selection.loopback.as_deref(), Some("Stereo Mix (Realtek)"));
    }

    #[test]
    fn localized_loopback_names_match() {
        let selection = select_from_inputs(&[
            endpoint("Mixagem estéreo (Realtek)", 2),
            endpoint("Microfone (Realtek)", 2),
        ]);
        assert_eq!(
            selection.loopback.as_deref(),
            Some("Mixagem estéreo (Realtek)")
        );
    }

    #[test]
    fn mix_named_device_is_fallback_loopback() {
        let selection = select_from_inputs(&[
            endpoint("Microphone (USB)", 2),
            endpoint("Wave Mix Capture", 2),
        ]);
        assert_eq!(selection.loopback.as_deref(), Some("Wave Mix Capture"));
        assert_eq!(selection.microphone.as_deref(), Some("Microphone (USB)"));
    }

    #[test]
    fn heuristic_loopback_never_equals_microphone() {
        // Contains both "mix" and "input": eligible for both roles.
        let selection = select_from_inputs(&[endpoint("Line Input Mix", 2)]);
        assert_eq!(selection.loopback.as_deref(), Some("Line Input Mix"));
        assert_eq!(selection.microphone, None);
    }

    #[test]
    fn zero_channel_devices_are_skipped_for_mic() {
        let selection = select_from_inputs(&[
            endpoint("Microphone (Dead)", 0),
            endpoint("Microphone (Live)", 1),
        ]);
        assert_eq!(selection.microphone.as_deref(), Some("Microphone (Live)"));
    }

    #[test]
    fn no_candidates_leaves_loopback_absent() {
        let selection = select_from_inputs(&[endpoint("Line In", 2)]);
        assert_eq!(selection.loopback, None);
    }

    #[test]
    fn single_source_args_have_no_filter_stage() {
        let platform = WindowsPlatform::new(PathBuf::from("ffmpeg.exe"));
        let args = platform.build_capture_args("loop-id", None, Path::new("C:\\out\\audio.wav"));
        assert!(!args.iter().any(|a| a == "-filter_complex"));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert!(args.contains(&"audio=loop-id".to_string()));
        assert!(args.contains(&"-y".to_string()));
        assert!(args.contains(&"48000".to_string()));
    }

    #[test]
    fn dual_source_args_merge_with_documented_gains() {
        let platform = WindowsPlatform::new(PathBuf::from("ffmpeg.exe"));
        let args =
            platform.build_capture_args("loop-id", Some("mic-id"), Path::new("C:\\out\\audio.wav"));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);

        let filter_pos = args.iter().position(|a| a == "-filter_complex").unwrap();
        let filter = &args[filter_pos + 1];
        assert!(filter.contains("volume=0.9"));
        assert!(filter.contains("volume=1.2"));
        assert!(filter.contains("amerge=inputs=2"));
        assert!(filter.contains("pan=stereo|c0<c0+c2|c1<c1+c3"));
        assert_eq!(filter.matches("amerge").count(), 1);
    }
}
