//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Calls the generateContent endpoint with a bounded request timeout.
//! Configuration priority: environment variables > ~/.config/reef/secret.json

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use reef_core::{ReefError, Result};

use crate::backend::CompletionBackend;
use crate::config;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Completion backend that talks to the Gemini HTTP API.
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    /// Latched after an authentication failure; a bad key will not recover
    /// within one session, so later requests are skipped entirely.
    disabled: AtomicBool,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key, model and per-request
    /// timeout. The timeout covers connect and read for each request.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ReefError::operation_failed(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            disabled: AtomicBool::new(false),
        })
    }

    /// Loads the API key from the environment or secret.json.
    ///
    /// Returns `Ok(None)` when no key is configured; the terminal then runs
    /// with the local pattern rules only.
    pub fn try_from_env(model: impl Into<String>, timeout: Duration) -> Result<Option<Self>> {
        let Some(api_key) = config::load_api_key()? else {
            return Ok(None);
        };
        Ok(Some(Self::new(api_key, model, timeout)?))
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            BASE_URL, self.model, self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ReefError::remote_unavailable("Gemini API request timed out")
                } else {
                    ReefError::remote_unavailable(format!("Gemini API request failed: {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            if is_auth_failure(status) {
                // Gemini reports an invalid key as 400 INVALID_ARGUMENT
                // rather than 401, so 400 latches the backend off too.
                self.disabled.store(true, Ordering::Relaxed);
                warn!(status = %status, "Gemini rejected the API key, remote translation disabled for this session");
            }
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ReefError::remote_unavailable(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionBackend for GeminiApiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.disabled.load(Ordering::Relaxed) {
            return Err(ReefError::remote_unavailable(
                "backend disabled after an authentication failure",
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.model, "sending translation request to Gemini");
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            ReefError::remote_unavailable("Gemini API returned no text in the response candidates")
        })
}

fn is_auth_failure(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}

fn map_http_error(status: StatusCode, body: String) -> ReefError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    ReefError::remote_unavailable(format!("HTTP {}: {}", status.as_u16(), message))
}
