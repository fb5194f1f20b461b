//! Capture session: external engine process lifecycle
//!
//! Owns the engine process exclusively across one recording. The session is
//! single-use: once it reaches a terminal state a new session is created for
//! the next recording.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{error, info, warn};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};

use crate::application::ports::{CaptureError, CapturePlatform};
use crate::domain::audio::OUTPUT_FILE_NAME;
use crate::domain::session::{session_dir_name, CaptureLifecycle, CaptureState, SessionKind};
use crate::domain::{AppConfig, InvalidStateTransition};

use super::super::platform::default_recordings_dir;

/// How long to wait after spawn before checking for an immediate exit.
const SETTLE_INTERVAL: Duration = Duration::from_millis(500);

/// The engine's graceful-quit control byte, written to its input channel.
const QUIT_BYTE: &[u8] = b"q";

/// Bounded waits for the stop escalation chain. Every blocking wait in the
/// session is covered by one of these, so the caller never hangs.
#[derive(Debug, Clone, Copy)]
pub struct StopTimeouts {
    /// Wait after the graceful quit byte.
    pub graceful: Duration,
    /// Wait after the terminate request, before the unconditional kill.
    pub terminate: Duration,
}

impl Default for StopTimeouts {
    fn default() -> Self {
        Self {
            graceful: Duration::from_secs(5),
            terminate: Duration::from_secs(2),
        }
    }
}

/// One in-flight or completed recording.
pub struct CaptureSession {
    engine: PathBuf,
    platform: Arc<dyn CapturePlatform>,
    config: AppConfig,
    timeouts: StopTimeouts,
    lifecycle: CaptureLifecycle,
    /// Exclusively owned; no other component signals or reads it.
    process: Option<Child>,
    output_path: Option<PathBuf>,
}

impl CaptureSession {
    pub fn new(engine: PathBuf, platform: Arc<dyn CapturePlatform>, config: AppConfig) -> Self {
        Self {
            engine,
            platform,
            config,
            timeouts: StopTimeouts::default(),
            lifecycle: CaptureLifecycle::new(),
            process: None,
            output_path: None,
        }
    }

    /// Override the stop escalation timeouts (tests use short ones).
    pub fn with_timeouts(mut self, timeouts: StopTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.lifecycle.state()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Start recording and return the output path.
    ///
    /// Fails before any state change: device selection and resolution run
    /// first, a missing loopback is `LoopbackNotFound` strictly before any
    /// process is spawned, and an engine that dies within the settle
    /// interval surfaces its diagnostic stream as `EngineStartFailure`.
    pub async fn start(&mut self) -> Result<PathBuf, CaptureError> {
        if self.lifecycle.state() != CaptureState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.lifecycle.state(),
                action: "start".to_string(),
            }
            .into());
        }

        let output_path = self.prepare_output_folder().await?;

        // Selection and resolution are short-lived external probes; keep
        // them off the async threads.
        let platform = Arc::clone(&self.platform);
        let config = self.config.clone();
        let selection = tokio::task::spawn_blocking(move || platform.select_devices(&config))
            .await
            .map_err(|e| CaptureError::EngineStartFailure(e.to_string()))?;

        let loopback = selection
            .loopback
            .filter(|id| !id.is_empty())
            .ok_or(CaptureError::LoopbackNotFound)?;
        let microphone = selection.microphone.filter(|id| !id.is_empty());

        let platform = Arc::clone(&self.platform);
        let (loopback_id, mic_id) = tokio::task::spawn_blocking(move || {
            let loopback_id = platform.resolve_identifier(&loopback);
            let mic_id = microphone.map(|mic| platform.resolve_identifier(&mic));
            (loopback_id, mic_id)
        })
        .await
        .map_err(|e| CaptureError::EngineStartFailure(e.to_string()))?;

        let args =
            self.platform
                .build_capture_args(&loopback_id, mic_id.as_deref(), &output_path);
        info!(
            "starting capture ({} source): {}",
            if mic_id.is_some() { "dual" } else { "single" },
            output_path.display()
        );

        let mut child = self.spawn_engine(&args)?;

        // An invalid device identifier makes the engine die right away;
        // catch that here instead of reporting success.
        sleep(SETTLE_INTERVAL).await;
        if let Ok(Some(status)) = child.try_wait() {
            let diagnostics = read_diagnostics(&mut child).await;
            error!("engine died immediately ({}): {}", status, diagnostics);
            return Err(CaptureError::EngineStartFailure(diagnostics));
        }

        self.process = Some(child);
        self.output_path = Some(output_path.clone());
        self.lifecycle.begin_running()?;
        info!("capture running, recording to {}", output_path.display());
        Ok(output_path)
    }

    /// Stop recording and return the validated output path.
    ///
    /// Escalation chain: quit byte, then terminate, then unconditional kill,
    /// each behind its bounded timeout. A missing or zero-byte output file is
    /// a capture failure regardless of the engine's exit status.
    pub async fn stop(&mut self) -> Result<PathBuf, CaptureError> {
        self.lifecycle.begin_stopping()?;

        let Some(mut child) = self.process.take() else {
            self.lifecycle.mark_failed();
            return Err(CaptureError::EngineStartFailure(
                "no engine process attached to this session".to_string(),
            ));
        };

        // Graceful: the engine finalizes the container on its quit byte.
        // Dropping stdin closes the control channel so the engine also sees
        // end-of-input.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(QUIT_BYTE).await;
            let _ = stdin.shutdown().await;
        }

        if timeout(self.timeouts.graceful, child.wait()).await.is_err() {
            warn!("engine ignored the quit request, terminating");
            request_terminate(&mut child);
            if timeout(self.timeouts.terminate, child.wait())
                .await
                .is_err()
            {
                error!("engine ignored the terminate request, killing");
                let _ = child.kill().await;
            }
        } else {
            info!("engine stopped gracefully");
        }

        let Some(output_path) = self.output_path.clone() else {
            self.lifecycle.mark_failed();
            return Err(CaptureError::EngineOutputInvalid(
                "no output path recorded for this session".to_string(),
            ));
        };

        match fs::metadata(&output_path).await {
            Ok(metadata) if metadata.len() > 0 => {
                self.lifecycle.mark_stopped()?;
                info!(
                    "recording stopped, {} bytes at {}",
                    metadata.len(),
                    output_path.display()
                );
                Ok(output_path)
            }
            Ok(_) => {
                self.lifecycle.mark_failed();
                Err(CaptureError::EngineOutputInvalid(format!(
                    "output file is empty: {}",
                    output_path.display()
                )))
            }
            Err(_) => {
                self.lifecycle.mark_failed();
                Err(CaptureError::EngineOutputInvalid(format!(
                    "output file does not exist: {}",
                    output_path.display()
                )))
            }
        }
    }

    async fn prepare_output_folder(&self) -> Result<PathBuf, CaptureError> {
        let base = self
            .config
            .output_folder
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_recordings_dir);
        let folder = base.join(session_dir_name(SessionKind::Live, Local::now()));

        fs::create_dir_all(&folder).await.map_err(|e| {
            CaptureError::EngineStartFailure(format!(
                "cannot create output folder {}: {}",
                folder.display(),
                e
            ))
        })?;

        Ok(folder.join(OUTPUT_FILE_NAME))
    }

    fn spawn_engine(&self, args: &[String]) -> Result<Child, CaptureError> {
        let mut command = Command::new(&self.engine);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        command.creation_flags(super::super::platform::no_window_flags());

        command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CaptureError::EngineMissing
            } else {
                CaptureError::EngineStartFailure(e.to_string())
            }
        })
    }
}

/// Ask the engine to terminate. SIGTERM where signals exist; elsewhere the
/// process is ended outright, as there is no graded terminate request.
#[cfg(unix)]
fn request_terminate(child: &mut Child) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    if let Some(id) = child.id() {
        let _ = signal::kill(Pid::from_raw(id as i32), Signal::SIGTERM);
    }
}

#[cfg(not(unix))]
fn request_terminate(child: &mut Child) {
    let _ = child.start_kill();
}

/// Drain the diagnostic stream of a dead engine for error reporting.
async fn read_diagnostics(child: &mut Child) -> String {
    use tokio::io::AsyncReadExt;

    let mut buffer = Vec::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_end(&mut buffer).await;
    }
    let text = String::from_utf8_lossy(&buffer);
    let tail: Vec<&str> = text.lines().rev().take(4).collect();
    if tail.is_empty() {
        "no diagnostics captured".to_string()
    } else {
        tail.into_iter().rev().collect::<Vec<_>>().join("\n")
    }
}
