//! Semantic extraction adapter: the network boundary of the pipeline.
//!
//! Defines the [`SemanticExtractor`] capability trait and the HTTP
//! implementation that wraps a remote text-understanding service. The rest
//! of the pipeline is deterministic and testable without network access:
//! everything that can go wrong out here (transport failure, timeout,
//! malformed answer) is a [`SemanticError`], which the AI-context layer
//! converts into an abstention and never reaches the caller.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::email::EmailMessage;

/// Body text beyond this is truncated before being sent to the service.
const MAX_BODY_CHARS: usize = 4000;

/// The structured answer the remote service must produce.
///
/// Any response that cannot be coerced into this shape is a parse failure
/// for the whole layer; there is no partial trust in a malformed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticAnswer {
    /// Company name, if the service found one.
    #[serde(default)]
    pub company: Option<String>,
    /// Position title, if found.
    #[serde(default)]
    pub position: Option<String>,
    /// Application date as written by the service (normalized downstream).
    #[serde(default)]
    pub applied_date: Option<String>,
    /// Self-reported confidence in [0,100].
    #[serde(default)]
    pub confidence: u8,
    /// Free-text reasoning, kept for logs only.
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Errors from the semantic extraction adapter.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// HTTP transport failure.
    #[error("semantic request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The bounded attempt did not complete in time.
    #[error("semantic request timed out after {0:?}")]
    Timeout(Duration),
    /// Upstream responded with an error status.
    #[error("semantic service returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// The answer did not match the expected shape.
    #[error("semantic answer unparseable: {0}")]
    Parse(String),
}

/// Capability interface for whole-email semantic extraction.
///
/// Implementations must be `Send + Sync`; the pipeline holds them behind an
/// `Arc` and calls at most once per ingestion.
#[async_trait]
pub trait SemanticExtractor: Send + Sync {
    /// Attempt one bounded extraction. No internal retries.
    async fn attempt(&self, email: &EmailMessage) -> Result<SemanticAnswer, SemanticError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Chat request body for an Ollama-compatible `/api/chat` endpoint.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Always false: one answer, no streaming.
    pub stream: bool,
    /// Ask the server to constrain output to JSON.
    pub format: &'static str,
}

/// A single chat message.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system" or "user".
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Chat response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// The assistant message.
    pub message: ChatMessage,
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// HTTP adapter for an Ollama-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpSemanticExtractor {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpSemanticExtractor {
    /// Create an adapter for the given endpoint and model.
    pub fn new(base_url: String, model: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            model,
            api_key,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, SemanticError> {
        let url = format!("{}/api/chat", self.base_url);
        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("authorization", format!("Bearer {key}"));
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SemanticError::HttpStatus {
                status: status.as_u16(),
                body: sanitize_error_body(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl SemanticExtractor for HttpSemanticExtractor {
    async fn attempt(&self, email: &EmailMessage) -> Result<SemanticAnswer, SemanticError> {
        let request = build_request(&self.model, email);
        let body = tokio::time::timeout(self.timeout, self.send(&request))
            .await
            .map_err(|_| SemanticError::Timeout(self.timeout))??;
        let response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| SemanticError::Parse(e.to_string()))?;
        parse_answer(&response.message.content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Build the chat request for an email.
#[doc(hidden)]
pub fn build_request(model: &str, email: &EmailMessage) -> ChatRequest {
    let mut body = email.body_text();
    if body.chars().count() > MAX_BODY_CHARS {
        body = body.chars().take(MAX_BODY_CHARS).collect();
    }
    let system = "You read job-application emails and answer with a single JSON object: \
                  {\"company\": string|null, \"position\": string|null, \
                  \"applied_date\": \"YYYY-MM-DD\"|null, \"confidence\": 0-100, \
                  \"reasoning\": string}. Only report values the email supports; \
                  use null when unsure. No text outside the JSON object.";
    let user = format!(
        "Subject: {}\nSender: {}\n\n{}",
        email.subject, email.sender, body
    );
    ChatRequest {
        model: model.to_owned(),
        messages: vec![
            ChatMessage {
                role: "system".to_owned(),
                content: system.to_owned(),
            },
            ChatMessage {
                role: "user".to_owned(),
                content: user,
            },
        ],
        stream: false,
        format: "json",
    }
}

/// Parse the assistant's answer text into a [`SemanticAnswer`].
///
/// Tolerates prose or code fences around the JSON object, and a confidence
/// reported either as an integer percentage or a 0.0–1.0 fraction.
///
/// # Errors
///
/// Returns [`SemanticError::Parse`] when no usable JSON object is present.
#[doc(hidden)]
pub fn parse_answer(content: &str) -> Result<SemanticAnswer, SemanticError> {
    let json = extract_json_object(content)
        .ok_or_else(|| SemanticError::Parse("no JSON object in answer".to_owned()))?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| SemanticError::Parse(e.to_string()))?;
    let confidence = normalize_confidence(value.get("confidence"));

    let field = |key: &str| -> Option<String> {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
            .map(str::to_owned)
    };

    Ok(SemanticAnswer {
        company: field("company"),
        position: field("position"),
        applied_date: field("applied_date").or_else(|| field("appliedDate")),
        confidence,
        reasoning: field("reasoning"),
    })
}

/// Coerce a reported confidence into [0,100].
///
/// Accepts an integer percentage, a 0.0–1.0 fraction, or nothing (0).
fn normalize_confidence(value: Option<&Value>) -> u8 {
    let Some(Value::Number(n)) = value else {
        return 0;
    };
    if let Some(i) = n.as_u64() {
        return u8::try_from(i.min(100)).unwrap_or(100);
    }
    match n.as_f64() {
        Some(f) if (0.0..=1.0).contains(&f) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            // rounded value is in [0,100] by the range check above
            let pct = (f * 100.0).round() as u8;
            pct.min(100)
        }
        Some(f) if f > 1.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            // clamped to [1,100] before the cast
            let pct = f.min(100.0).round() as u8;
            pct
        }
        _ => 0,
    }
}

/// Find the outermost JSON object in a block of text.
///
/// Depth-counts braces while respecting string literals, so fences and
/// surrounding prose do not confuse it.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth = depth.saturating_add(1),
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return text.get(start..=start.saturating_add(offset));
                }
            }
            _ => {}
        }
    }
    None
}

/// Redact credential-looking tokens and truncate an upstream error body
/// before it goes into logs or error messages.
fn sanitize_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut sanitized = collapsed;
    for pattern in [r"sk-[A-Za-z0-9_\-]{16,}", r"Bearer [A-Za-z0-9._\-]{8,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }
    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }
    sanitized
}
