// Handles communication with external AI API (Gemini)

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_INSTRUCTION: &str = r#"You are an expert Frontend React & Web Developer.
Your task is to generate a COMPLETE, SINGLE-FILE HTML solution based on the user's prompt.

RULES:
1. Output ONLY valid HTML code.
2. Do NOT wrap the code in Markdown blocks (like ```html ... ```). Just return the raw code string.
3. The HTML must include:
   - <!DOCTYPE html>
   - <html>, <head>, <body> tags.
   - Tailwind CSS via CDN: <script src="https://cdn.tailwindcss.com"></script>
   - FontAwesome via CDN (optional, if icons are needed): <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css">
   - Google Fonts (Inter or Poppins) for nice typography.
4. The design must be "World Class": Modern, clean, responsive, and visually stunning.
5. Use https://picsum.photos/width/height for any placeholder images.
6. If the user asks for interactivity, use vanilla JavaScript inside a <script> tag within the body.
7. If the user provides PREVIOUS CODE, you must update that code to satisfy the new request while keeping the existing functionality intact unless asked to remove it.
8. Do not output any explanation, strictly just the HTML code.
"#;

/// Client for the Gemini Generative Language API.
///
/// The API key is read from the `GEMINI_API_KEY` environment variable, or set
/// explicitly with [`with_api_key`](Self::with_api_key).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL. Used by tests to point at a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout. A timed-out call fails like any other error.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key.as_deref().ok_or_else(|| {
            GenerationError::new(
                "GEMINI_API_KEY not set. Set it via environment variable or with_api_key()",
            )
        })
    }

    /// Generate a complete single-file HTML document from `prompt`. When
    /// `previous_code` is given, the model is asked to update that document
    /// instead of starting from scratch and to return the full updated file.
    ///
    /// Sends exactly one request. The returned text has accidental markdown
    /// fences stripped but is otherwise unvalidated.
    pub async fn generate_website_code(
        &self,
        prompt: &str,
        previous_code: Option<&str>,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_user_prompt(prompt, previous_code),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
        };

        debug!(
            model = %self.model,
            refining = previous_code.is_some(),
            "sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| GenerationError::new(format!("API returned error status: {e}")))?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("failed to parse response: {e}")))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        let code = strip_code_fences(&text);
        if code.is_empty() {
            return Err(GenerationError::new("model returned no usable content"));
        }
        Ok(code)
    }

    /// List the model names available to the configured API key, for the
    /// UI's model picker.
    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models?key={}", self.base_url, api_key);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| GenerationError::new(format!("API returned error status: {e}")))?;

        let body: ModelsResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("failed to parse response: {e}")))?;

        Ok(body.models.into_iter().map(|m| m.name).collect())
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

// Either "create new" (prompt only) or "refine existing" (previous document
// verbatim plus the new request).
fn build_user_prompt(prompt: &str, previous_code: Option<&str>) -> String {
    match previous_code {
        Some(code) => format!(
            "HERE IS THE EXISTING CODE:\n{code}\n\n\
             USER REQUEST:\n{prompt}\n\n\
             INSTRUCTIONS:\n\
             Refactor the existing code to fulfill the user request. \
             Return the FULL updated HTML file."
        ),
        None => format!("Create a new website based on this request:\n\"{prompt}\""),
    }
}

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?").expect("fence regex"));
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n?```\s*$").expect("fence regex"));

/// Remove markdown code-block delimiters the model sometimes adds despite
/// instructions, and trim surrounding whitespace. A no-op on clean input,
/// so applying it twice yields the same result as once.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let opened = FENCE_OPEN.replace(trimmed, "");
    let closed = FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}

// Request/response types for the generateContent endpoint

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}
