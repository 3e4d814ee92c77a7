// Manages per-session generation state

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// One successful generation, kept in memory for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct GenerationRecord {
    pub prompt: String,
    pub artifact: String,
    pub created_at: DateTime<Utc>,
}

/// Shared session state. The controller is the only writer; the presentation
/// layer reads through the handle returned by
/// [`SessionController::state`](crate::controller::SessionController::state).
#[derive(Debug, Default)]
pub struct SessionState {
    pub current_prompt: String,
    /// Full self-contained HTML document from the most recent successful
    /// generation. Empty until the first success, never a diff or fragment.
    pub current_artifact: String,
    pub is_busy: bool,
    pub last_error: Option<String>,
    pub history: Vec<GenerationRecord>,
    pub(crate) cancellation_token: Option<CancellationToken>,
}

impl SessionState {
    /// Point-in-time copy of the fields the presentation layer renders.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_prompt: self.current_prompt.clone(),
            current_artifact: self.current_artifact.clone(),
            is_busy: self.is_busy,
            last_error: self.last_error.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub current_prompt: String,
    pub current_artifact: String,
    pub is_busy: bool,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = SessionState::default();
        assert!(state.current_prompt.is_empty());
        assert!(state.current_artifact.is_empty());
        assert!(!state.is_busy);
        assert!(state.last_error.is_none());
        assert!(state.history.is_empty());
        assert!(state.cancellation_token.is_none());
    }

    #[test]
    fn snapshot_copies_render_fields() {
        let mut state = SessionState::default();
        state.current_prompt = "a coffee shop".to_string();
        state.current_artifact = "<!DOCTYPE html><html></html>".to_string();
        state.last_error = Some("oops".to_string());

        let snap = state.snapshot();
        assert_eq!(snap.current_prompt, state.current_prompt);
        assert_eq!(snap.current_artifact, state.current_artifact);
        assert_eq!(snap.last_error, state.last_error);
        assert!(!snap.is_busy);
    }
}
