/// LLM Client: the single point of entry for all generative-language calls in Bridge It.
///
/// ARCHITECTURAL RULE: No other module may call the model API directly.
/// Feature modules depend on the `TextGenerator` trait; `LlmClient` is the
/// production implementation backed by the Generative Language
/// `generateContent` endpoint.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Malformed model output ({reason})")]
    MalformedOutput { raw: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of a conversation sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Text-completion seam. Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Runs a conversation under `system` and returns the model's plain-text reply.
    async fn generate(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError>;

    /// Single-prompt convenience over `generate`.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.generate(system, &[ChatTurn::user(prompt)]).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: WireContent<'a>,
    contents: Vec<WireContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl LlmResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production model client used by all services in Bridge It.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_attempts: u32,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()?,
            api_key: config.gemini_api_key.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            max_attempts: config.llm_max_attempts.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Makes a raw call to the model API, returning the full response object.
    /// With more than one attempt configured, 429 and 5xx responses are
    /// retried with exponential backoff.
    pub async fn call(&self, system: &str, turns: &[ChatTurn]) -> Result<LlmResponse, LlmError> {
        let request_body = GenerateRequest {
            system_instruction: WireContent {
                role: None,
                parts: vec![WirePart { text: system }],
            },
            contents: turns
                .iter()
                .map(|t| WireContent {
                    role: Some(match t.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    }),
                    parts: vec![WirePart { text: &t.text }],
                })
                .collect(),
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                tokio::time::sleep(delay).await;
            }
            attempt += 1;

            let error = match self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Err(e) => LlmError::Http(e),
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        warn!("LLM API returned {}: {}", status, body);
                        LlmError::Api {
                            status: status.as_u16(),
                            message: body,
                        }
                    } else if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        let message = serde_json::from_str::<ApiError>(&body)
                            .map(|e| e.error.message)
                            .unwrap_or(body);
                        return Err(LlmError::Api {
                            status: status.as_u16(),
                            message,
                        });
                    } else {
                        let llm_response: LlmResponse = response.json().await?;
                        if let Some(usage) = &llm_response.usage_metadata {
                            debug!(
                                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                                usage.prompt_token_count, usage.candidates_token_count
                            );
                        }
                        return Ok(llm_response);
                    }
                }
            };

            if attempt >= self.max_attempts {
                return Err(error);
            }
            warn!(
                "LLM call attempt {}/{} failed ({}), retrying...",
                attempt, self.max_attempts, error
            );
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError> {
        let response = self.call(system, turns).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured output helpers
// ────────────────────────────────────────────────────────────────────────────

/// Parses a JSON object out of free-form model text.
///
/// Order: strip code fences and parse; otherwise parse the slice between the
/// first `{` and the last `}`; otherwise `LlmError::MalformedOutput`.
pub fn parse_json_lenient<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let stripped = strip_json_fences(text);
    let first_err = match serde_json::from_str::<T>(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let Some(candidate) = extract_json_object(stripped) else {
        return Err(LlmError::MalformedOutput {
            raw: text.to_string(),
            reason: format!("no JSON object found: {first_err}"),
        });
    };

    serde_json::from_str::<T>(candidate).map_err(|e| LlmError::MalformedOutput {
        raw: text.to_string(),
        reason: e.to_string(),
    })
}

/// Returns the slice from the first `{` to the last `}`, if both exist in order.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub mod testing {
    //! Canned generators for exercising model-dependent code without a network.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Answers each prompt with the first rule whose needle appears in the
    /// prompt text; falls back to `default`.
    pub struct StubGenerator {
        rules: Vec<(&'static str, String)>,
        default: String,
        calls: AtomicUsize,
        pub last_system: Mutex<Option<String>>,
    }

    impl StubGenerator {
        pub fn new(default: impl Into<String>) -> Self {
            Self {
                rules: Vec::new(),
                default: default.into(),
                calls: AtomicUsize::new(0),
                last_system: Mutex::new(None),
            }
        }

        pub fn with_rule(mut self, needle: &'static str, reply: impl Into<String>) -> Self {
            self.rules.push((needle, reply.into()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_system.lock().unwrap() = Some(system.to_string());
            let prompt = turns.last().map(|t| t.text.as_str()).unwrap_or_default();
            Ok(self
                .rules
                .iter()
                .find(|(needle, _)| prompt.contains(needle))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| self.default.clone()))
        }
    }

    /// Always fails, for error-path tests.
    pub struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _system: &str, _turns: &[ChatTurn]) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            })
        }
    }
}
