// Drives generation calls and owns all session state mutation

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::gemini_api::GeminiClient;
use crate::session::{GenerationRecord, SessionSnapshot, SessionState};

/// Shown to the user when a generation attempt fails for any reason.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Something went wrong while generating the website. Please try again.";

/// Single writer of [`SessionState`]. Cheap to clone; clones share the same
/// session.
#[derive(Debug, Clone)]
pub struct SessionController {
    client: GeminiClient,
    state: Arc<Mutex<SessionState>>,
}

impl SessionController {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Shared handle for read-only consumers.
    pub fn state(&self) -> Arc<Mutex<SessionState>> {
        Arc::clone(&self.state)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Generate an artifact from `prompt`, refining the current artifact if
    /// one exists. Never fails to the caller; errors land in `last_error`.
    ///
    /// Empty prompts are ignored, and a call made while a generation is
    /// already running is rejected so at most one is in flight per session.
    pub async fn generate(&self, prompt: &str) {
        if prompt.trim().is_empty() {
            warn!("ignoring empty prompt");
            return;
        }

        let token = CancellationToken::new();
        let previous = {
            let mut state = self.state.lock().await;
            if state.is_busy {
                warn!("generation already running, rejecting submission");
                return;
            }
            state.is_busy = true;
            state.last_error = None;
            state.current_prompt = prompt.to_string();
            state.cancellation_token = Some(token.clone());

            (!state.current_artifact.is_empty()).then(|| state.current_artifact.clone())
        };

        let outcome = tokio::select! {
            result = self.client.generate_website_code(prompt, previous.as_deref()) => Some(result),
            _ = token.cancelled() => None,
        };

        let mut state = self.state.lock().await;
        match outcome {
            Some(Ok(artifact)) => {
                state.history.push(GenerationRecord {
                    prompt: prompt.to_string(),
                    artifact: artifact.clone(),
                    created_at: chrono::Utc::now(),
                });
                state.current_artifact = artifact;
            }
            Some(Err(e)) => {
                error!(detail = e.detail(), "generation failed");
                state.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
            None => {
                debug!("generation aborted");
            }
        }
        state.is_busy = false;
        state.cancellation_token = None;
    }

    /// Cancel the in-flight generation, if any. The artifact and error are
    /// left untouched; the running [`generate`](Self::generate) call clears
    /// the busy flag itself as it unwinds.
    pub async fn abort(&self) {
        let state = self.state.lock().await;
        if let Some(token) = &state.cancellation_token {
            token.cancel();
        }
    }

    /// Dismiss the last error without touching the artifact.
    pub async fn dismiss_error(&self) {
        self.state.lock().await.last_error = None;
    }

    /// Reset the session for a fresh site: clears the artifact, prompt,
    /// error, and history. Ignored while a generation is running.
    pub async fn clear_session(&self) {
        let mut state = self.state.lock().await;
        if state.is_busy {
            warn!("generation running, not clearing session");
            return;
        }
        *state = SessionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Points at a closed port; tests here never reach the network.
    fn offline_controller() -> SessionController {
        let client = GeminiClient::new()
            .with_api_key("test-key")
            .with_base_url("http://127.0.0.1:1");
        SessionController::new(client)
    }

    #[tokio::test]
    async fn empty_prompt_is_ignored() {
        let controller = offline_controller();
        controller.generate("   ").await;

        let snap = controller.snapshot().await;
        assert!(snap.current_prompt.is_empty());
        assert!(!snap.is_busy);
        assert!(snap.last_error.is_none());
    }

    #[tokio::test]
    async fn dismiss_error_clears_message_only() {
        let controller = offline_controller();
        {
            let state = controller.state();
            let mut state = state.lock().await;
            state.current_artifact = "<!DOCTYPE html>".to_string();
            state.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
        }

        controller.dismiss_error().await;

        let snap = controller.snapshot().await;
        assert!(snap.last_error.is_none());
        assert_eq!(snap.current_artifact, "<!DOCTYPE html>");
    }

    #[tokio::test]
    async fn clear_session_resets_everything() {
        let controller = offline_controller();
        {
            let state = controller.state();
            let mut state = state.lock().await;
            state.current_prompt = "a blog".to_string();
            state.current_artifact = "<!DOCTYPE html>".to_string();
            state.history.push(GenerationRecord {
                prompt: "a blog".to_string(),
                artifact: "<!DOCTYPE html>".to_string(),
                created_at: chrono::Utc::now(),
            });
        }

        controller.clear_session().await;

        let snap = controller.snapshot().await;
        assert!(snap.current_prompt.is_empty());
        assert!(snap.current_artifact.is_empty());
        assert!(controller.state().lock().await.history.is_empty());
    }

    #[tokio::test]
    async fn clear_session_is_ignored_while_busy() {
        let controller = offline_controller();
        {
            let state = controller.state();
            let mut state = state.lock().await;
            state.is_busy = true;
            state.current_artifact = "<!DOCTYPE html>".to_string();
        }

        controller.clear_session().await;

        let state = controller.state();
        let state = state.lock().await;
        assert!(state.is_busy);
        assert_eq!(state.current_artifact, "<!DOCTYPE html>");
    }

    #[tokio::test]
    async fn abort_without_inflight_generation_is_a_no_op() {
        let controller = offline_controller();
        controller.abort().await;
        assert!(!controller.snapshot().await.is_busy);
    }

    #[tokio::test]
    async fn transport_failure_sets_static_message() {
        let controller = offline_controller();
        controller.generate("A landing page for a coffee shop").await;

        let snap = controller.snapshot().await;
        assert!(!snap.is_busy);
        assert!(snap.current_artifact.is_empty());
        assert_eq!(snap.last_error.as_deref(), Some(GENERATION_FAILED_MESSAGE));
        assert_eq!(snap.current_prompt, "A landing page for a coffee shop");
    }
}
