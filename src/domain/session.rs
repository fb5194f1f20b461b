//! Capture session state machine and session folder naming

use std::fmt;

use thiserror::Error;

/// Capture session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl CaptureState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Terminal states; a session that reached one is never restarted.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Capture lifecycle entity.
/// Validates state transitions for one recording.
///
/// State machine:
///   IDLE -> RUNNING (begin_running)
///   RUNNING -> STOPPING (begin_stopping)
///   STOPPING -> STOPPED (mark_stopped)
///   STOPPING -> FAILED (mark_failed)
///   any non-terminal -> FAILED (mark_failed)
#[derive(Debug, Default)]
pub struct CaptureLifecycle {
    state: CaptureState,
}

impl CaptureLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn begin_running(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start".to_string(),
            });
        }
        self.state = CaptureState::Running;
        Ok(())
    }

    pub fn begin_stopping(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Running {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "stop".to_string(),
            });
        }
        self.state = CaptureState::Stopping;
        Ok(())
    }

    pub fn mark_stopped(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Stopping {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "complete".to_string(),
            });
        }
        self.state = CaptureState::Stopped;
        Ok(())
    }

    /// Failure is reachable from any non-terminal state.
    pub fn mark_failed(&mut self) {
        if !self.state.is_terminal() {
            self.state = CaptureState::Failed;
        }
    }
}

/// Whether a session folder holds a live recording or an imported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Live,
    Import,
}

impl SessionKind {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Import => "Import",
        }
    }
}

/// Timestamped folder name for one session, e.g. `Live_2026-08-30_14-03-22`.
pub fn session_dir_name(kind: SessionKind, at: chrono::DateTime<chrono::Local>) -> String {
    format!("{}_{}", kind.prefix(), at.format("%Y-%m-%d_%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        let lifecycle = CaptureLifecycle::new();
        assert_eq!(lifecycle.state(), CaptureState::Idle);
    }

    #[test]
    fn full_lifecycle_reaches_stopped() {
        let mut lifecycle = CaptureLifecycle::new();
        lifecycle.begin_running().unwrap();
        assert_eq!(lifecycle.state(), CaptureState::Running);
        lifecycle.begin_stopping().unwrap();
        assert_eq!(lifecycle.state(), CaptureState::Stopping);
        lifecycle.mark_stopped().unwrap();
        assert_eq!(lifecycle.state(), CaptureState::Stopped);
        assert!(lifecycle.state().is_terminal());
    }

    #[test]
    fn cannot_start_twice() {
        let mut lifecycle = CaptureLifecycle::new();
        lifecycle.begin_running().unwrap();
        let err = lifecycle.begin_running().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Running);
    }

    #[test]
    fn cannot_stop_while_idle() {
        let mut lifecycle = CaptureLifecycle::new();
        assert!(lifecycle.begin_stopping().is_err());
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut lifecycle = CaptureLifecycle::new();
        lifecycle.begin_running().unwrap();
        lifecycle.begin_stopping().unwrap();
        lifecycle.mark_stopped().unwrap();
        // A finished session is single-use.
        assert!(lifecycle.begin_running().is_err());
        lifecycle.mark_failed();
        assert_eq!(lifecycle.state(), CaptureState::Stopped);
    }

    #[test]
    fn failure_reachable_from_running() {
        let mut lifecycle = CaptureLifecycle::new();
        lifecycle.begin_running().unwrap();
        lifecycle.mark_failed();
        assert_eq!(lifecycle.state(), CaptureState::Failed);
    }

    #[test]
    fn session_dir_names_carry_kind_prefix() {
        let at = chrono::Local::now();
        assert!(session_dir_name(SessionKind::Live, at).starts_with("Live_"));
        assert!(session_dir_name(SessionKind::Import, at).starts_with("Import_"));
    }
}
