/// LLM Client: the single point of entry for all chat-completion calls.
///
/// Talks to any OpenAI-compatible `/chat/completions` endpoint. Each attempt is
/// bounded by a timeout; a primary failure that reports the model as unknown or
/// unavailable is retried exactly once against the fallback model.
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

static MODEL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)model").expect("static regex"));
static UNAVAILABLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(not|unknown|found|available)").expect("static regex"));

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream request to model '{model}' timed out after {timeout_ms}ms")]
    Timeout { model: String, timeout_ms: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LlmError {
    /// True when the upstream rejected the request because the model is
    /// unknown or unavailable. Only API errors qualify.
    pub fn is_model_unavailable(&self) -> bool {
        match self {
            LlmError::Api { message, .. } => is_model_unavailable_body(message),
            _ => false,
        }
    }
}

/// Matches upstream error bodies that mention the model together with a
/// not-found / unavailable marker.
pub fn is_model_unavailable_body(body: &str) -> bool {
    MODEL_WORD.is_match(body) && UNAVAILABLE_WORD.is_match(body)
}

/// A single chat message sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Text returned by a successful call, plus the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

/// Wraps the chat-completion API with a per-attempt timeout and a single
/// fallback-model retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        max_tokens: Option<u32>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_tokens,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls the primary model; on a "model unavailable" failure, calls the
    /// fallback model once. When both fail the fallback's error is returned.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        primary_model: &str,
        fallback_model: Option<&str>,
    ) -> Result<Completion, LlmError> {
        let err = match self.attempt(primary_model, messages).await {
            Ok(text) => {
                return Ok(Completion {
                    text,
                    model: primary_model.to_string(),
                })
            }
            Err(e) => e,
        };

        let fallback = match fallback_model {
            Some(f) if f != primary_model && err.is_model_unavailable() => f,
            _ => return Err(err),
        };

        warn!("Model '{primary_model}' unavailable ({err}), retrying with '{fallback}'");

        let text = self.attempt(fallback, messages).await?;
        Ok(Completion {
            text,
            model: fallback.to_string(),
        })
    }

    /// One bounded request. Dropping the inner future on expiry cancels the
    /// in-flight request.
    async fn attempt(&self, model: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request_body = ChatCompletionRequest {
            model,
            messages,
            max_tokens: self.max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let call = async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(self.transport_error(model, e)),
            Err(_) => return Err(self.timeout_error(model)),
        };

        if !status.is_success() {
            warn!("LLM API returned {} for model '{}': {}", status, model, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let json: Value = serde_json::from_str(&body)?;
        if let Some(usage) = json.get("usage") {
            debug!("LLM call succeeded: model={model}, usage={usage}");
        }

        Ok(extract_text(&json))
    }

    fn timeout_error(&self, model: &str) -> LlmError {
        LlmError::Timeout {
            model: model.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }

    /// Transport failures that reqwest itself classifies as timeouts are
    /// reported as timeouts, not network errors.
    fn transport_error(&self, model: &str, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            self.timeout_error(model)
        } else {
            LlmError::Http(err)
        }
    }
}

/// Pulls `choices[0].message.content`, trimmed. Absent or non-string content
/// yields an empty string.
fn extract_text(json: &Value) -> String {
    json.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
