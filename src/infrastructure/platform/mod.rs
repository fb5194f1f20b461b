//! Platform probe and capability selection
//!
//! Answers "which OS am I on", locates the capture engine binary, and picks
//! the concrete [`CapturePlatform`] implementation once at startup.

mod linux;
mod windows;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::CapturePlatform;

pub use linux::LinuxPlatform;
pub use windows::WindowsPlatform;

/// OS classification for capture purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Other,
}

/// Pure OS classification.
pub const fn current_platform() -> Platform {
    if cfg!(windows) {
        Platform::Windows
    } else if cfg!(target_os = "linux") {
        Platform::Linux
    } else {
        Platform::Other
    }
}

/// Name of the capture engine binary on this platform.
pub const fn engine_binary_name() -> &'static str {
    if cfg!(windows) {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    }
}

/// Process-creation flags that suppress a visible console window.
/// Non-zero only on Windows.
#[cfg(windows)]
pub const fn no_window_flags() -> u32 {
    windows_sys::Win32::System::Threading::CREATE_NO_WINDOW
}

#[cfg(not(windows))]
pub const fn no_window_flags() -> u32 {
    0
}

/// Apply the no-window flags to a probe command. No-op off Windows.
pub(crate) fn hide_window(command: &mut std::process::Command) {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(no_window_flags());
    }
    #[cfg(not(windows))]
    {
        let _ = command;
    }
}

/// Locate the capture engine binary.
///
/// Search order: a `bin/` directory next to the installed executable, the
/// same inside a runtime-extraction directory when running from a single-file
/// bundle (`APPDIR`), then the system `PATH`. Returns the first existing,
/// executable match. `None` means "capture engine unavailable" and must be
/// surfaced as a setup instruction, not a crash.
pub fn locate_capture_engine() -> Option<PathBuf> {
    let name = engine_binary_name();

    let mut bundled_dirs = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(install_root) = exe.parent() {
            bundled_dirs.push(install_root.join("bin"));
        }
    }
    if let Ok(appdir) = std::env::var("APPDIR") {
        bundled_dirs.push(PathBuf::from(appdir).join("bin"));
    }

    for dir in &bundled_dirs {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }

    search_path(std::env::var_os("PATH").as_deref(), name)
}

/// Select the capture capability implementation for this process.
///
/// Non-Windows, non-Linux hosts fall through to the Linux implementation;
/// its enumeration degrades to "no devices" where the audio server is absent.
pub fn create_platform(engine: PathBuf) -> Arc<dyn CapturePlatform> {
    match current_platform() {
        Platform::Windows => Arc::new(WindowsPlatform::new(engine)),
        Platform::Linux | Platform::Other => Arc::new(LinuxPlatform::new(engine)),
    }
}

/// Default base folder for recordings: `Documents/MixScribe_Recordings`
/// when a Documents directory exists, else the same under home.
pub fn default_recordings_dir() -> PathBuf {
    if let Some(docs) = dirs::document_dir() {
        if docs.is_dir() {
            return docs.join("MixScribe_Recordings");
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("MixScribe_Recordings")
}

fn search_path(path_var: Option<&std::ffi::OsStr>, name: &str) -> Option<PathBuf> {
    let path_var = path_var?;
    for dir in std::env::split_paths(path_var) {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        // Windows installs sometimes ship the binary without the suffix.
        if cfg!(windows) && name != "ffmpeg" {
            let bare = dir.join("ffmpeg");
            if is_executable(&bare) {
                return Some(bare);
            }
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_matches_build_target() {
        let platform = current_platform();
        if cfg!(windows) {
            assert_eq!(platform, Platform::Windows);
        } else if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Linux);
        } else {
            assert_eq!(platform, Platform::Other);
        }
    }

    #[test]
    fn no_window_flags_empty_off_windows() {
        if !cfg!(windows) {
            assert_eq!(no_window_flags(), 0);
        }
    }

    #[cfg(unix)]
    #[test]
    fn search_path_finds_executable_entries_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("ffmpeg");
        std::fs::write(&plain, b"#!/bin/sh\n").unwrap();

        // Not executable yet: must be skipped.
        let path_var = std::ffi::OsString::from(dir.path());
        assert_eq!(search_path(Some(&path_var), "ffmpeg"), None);

        let mut perms = std::fs::metadata(&plain).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&plain, perms).unwrap();

        assert_eq!(search_path(Some(&path_var), "ffmpeg"), Some(plain));
    }

    #[test]
    fn search_path_handles_missing_var() {
        assert_eq!(search_path(None, "ffmpeg"), None);
    }

    #[test]
    fn default_recordings_dir_is_named() {
        let dir = default_recordings_dir();
        assert!(dir.ends_with("MixScribe_Recordings"));
    }
}
