//! Main app runners for recording, importing, and device listing

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use tokio::fs;

use crate::application::ports::{CaptureError, ConfigStore, TranscriptionError};
use crate::application::{TranscribeAudioUseCase, TranscribeError};
use crate::domain::config::AppConfig;
use crate::domain::session::{session_dir_name, SessionKind};
use crate::infrastructure::{
    create_platform, default_recordings_dir, locate_capture_engine, CaptureSession,
    JsonConfigStore, WhisperCliTranscriber,
};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How to enable a loopback source, shown when none is found.
const LOOPBACK_HINT: &str = "To record system audio, enable a system-audio capture source \
    (Stereo Mix in the Windows sound settings, or a PulseAudio/PipeWire monitor on Linux), \
    then try again.";

/// Load config from the store and overlay CLI overrides
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = JsonConfigStore::new();
    let stored = store.load().await.unwrap_or_else(|e| {
        log::warn!("ignoring unreadable config: {}", e);
        AppConfig::empty()
    });
    stored.merge(cli_config)
}

/// Record until Ctrl-C, then transcribe unless disabled
pub async fn run_record(config: AppConfig, no_transcribe: bool) -> ExitCode {
    let mut presenter = Presenter::new();

    let Some(engine) = locate_capture_engine() else {
        presenter.error(&CaptureError::EngineMissing.to_string());
        return ExitCode::from(EXIT_ERROR);
    };
    let platform = create_platform(engine.clone());

    let mut session = CaptureSession::new(engine, platform, config.clone());
    let audio_path = match session.start().await {
        Ok(path) => path,
        Err(e @ CaptureError::LoopbackNotFound) => {
            presenter.error(&e.to_string());
            presenter.info(LOOPBACK_HINT);
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.info(&format!("Recording to {}", audio_path.display()));
    presenter.info("Press Ctrl-C to stop.");

    if let Err(e) = tokio::signal::ctrl_c().await {
        presenter.error(&format!("Failed to wait for Ctrl-C: {}", e));
        // Fall through to stop() so the engine is not left running.
    }

    presenter.start_spinner("Stopping recording...");
    let audio_path = match session.stop().await {
        Ok(path) => {
            presenter.spinner_success(&format!("Recording saved: {}", path.display()));
            path
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if no_transcribe {
        presenter.output(&audio_path.display().to_string());
        return ExitCode::from(EXIT_SUCCESS);
    }

    transcribe_and_report(&audio_path, SessionKind::Live, &config, &mut presenter).await
}

/// Copy an existing audio file into an import session folder and transcribe it
pub async fn run_import(file: &Path, config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    if !file.is_file() {
        presenter.error(&format!("No such audio file: {}", file.display()));
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let base = config
        .output_folder
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_recordings_dir);
    let folder = base.join(session_dir_name(SessionKind::Import, Local::now()));
    let file_name = file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "audio.wav".into());
    let destination = folder.join(file_name);

    if let Err(e) = fs::create_dir_all(&folder).await {
        presenter.error(&format!("Cannot create {}: {}", folder.display(), e));
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = fs::copy(file, &destination).await {
        presenter.error(&format!("Cannot import {}: {}", file.display(), e));
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.info(&format!("Imported to {}", destination.display()));

    transcribe_and_report(&destination, SessionKind::Import, &config, &mut presenter).await
}

/// Print the device catalog
pub async fn run_devices() -> ExitCode {
    let presenter = Presenter::new();

    let Some(engine) = locate_capture_engine() else {
        presenter.error(&CaptureError::EngineMissing.to_string());
        return ExitCode::from(EXIT_ERROR);
    };
    let platform = create_platform(engine);

    // Enumeration is a short blocking probe.
    let devices = tokio::task::spawn_blocking({
        let platform = Arc::clone(&platform);
        move || platform.list_devices()
    })
    .await
    .unwrap_or_default();

    if devices.is_empty() {
        presenter.warn("No capture devices found.");
        return ExitCode::from(EXIT_SUCCESS);
    }

    for device in devices {
        presenter.output(&format!(
            "{}\t{}\t{}",
            device.kind, device.friendly_name, device.raw_identifier
        ));
    }
    ExitCode::from(EXIT_SUCCESS)
}

async fn transcribe_and_report(
    audio_path: &Path,
    kind: SessionKind,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let transcriber = WhisperCliTranscriber::from_config(config);
    let use_case = TranscribeAudioUseCase::new(transcriber);

    presenter.start_spinner("Transcribing...");
    match use_case.execute(audio_path, kind).await {
        Ok(output) => {
            presenter.spinner_success(&format!(
                "Transcript ({} segments): {}",
                output.segment_count,
                output.report_path.display()
            ));
            presenter.output(&output.report_path.display().to_string());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(TranscribeError::Transcription(TranscriptionError::EngineUnavailable(message))) => {
            presenter.stop_spinner();
            presenter.warn(&format!("Transcription skipped: {}", message));
            presenter.output(&audio_path.display().to_string());
            // The recording itself succeeded.
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
