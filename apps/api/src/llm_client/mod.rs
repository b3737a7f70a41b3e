/// LLM Client: the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All inference goes through the `InferenceBackend` trait defined here.
///
/// One request per call. There is no retry loop: a failed analysis is final and
/// resubmission creates a new job.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication rejected (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Quota exhausted: {message}")]
    Quota { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request blocked by the model: {reason}")]
    Blocked { reason: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Binary document sent inline with the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAttachment {
    pub mime_type: String,
    /// Base64 payload, without any data-URL prefix.
    pub data: String,
}

/// One inference request: instruction text plus an optional inline document.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
    pub attachment: Option<InlineAttachment>,
}

/// A hosted generative model. Carried in `AppState` as `Arc<dyn InferenceBackend>`
/// so tests can substitute a scripted backend.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends the request and returns the model's raw text reply.
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ReplyContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl InferenceBackend for GeminiClient {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let mut parts = Vec::with_capacity(2);
        if let Some(attachment) = &request.attachment {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: &attachment.mime_type,
                    data: &attachment.data,
                },
            });
        }
        parts.push(Part::Text {
            text: &request.prompt,
        });

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            warn!("Gemini API returned {status}: {message}");
            return Err(classify_failure(status, message));
        }

        let reply: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &reply.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        if let Some(reason) = reply
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked { reason });
        }

        match reply.text() {
            Some(text) => Ok(text),
            None => {
                if let Some(reason) = reply.candidates.first().and_then(|c| c.finish_reason.clone())
                {
                    debug!("Gemini returned no text, finish_reason={reason}");
                }
                Err(LlmError::EmptyContent)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn classify_failure(status: StatusCode, message: String) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::Quota { message },
        _ => LlmError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            "test-model".to_string(),
            server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn text_request() -> LlmRequest {
        LlmRequest {
            prompt: "Evaluate this resume".to_string(),
            attachment: None,
        }
    }

    fn reply_with(parts: serde_json::Value) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": parts },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 30 }
        })
    }

    #[tokio::test]
    async fn test_generate_returns_concatenated_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with(json!([
                { "text": "{\"hire_recommendation\":" },
                { "text": "\"yes\"}" }
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate(&text_request()).await.unwrap();
        assert_eq!(text, "{\"hire_recommendation\":\"yes\"}");
    }

    #[tokio::test]
    async fn test_attachment_is_sent_before_prompt_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply_with(json!([{ "text": "{}" }]))),
            )
            .mount(&server)
            .await;

        let request = LlmRequest {
            prompt: "Evaluate the attached resume".to_string(),
            attachment: Some(InlineAttachment {
                mime_type: "application/pdf".to_string(),
                data: "JVBERi0xLjQ=".to_string(),
            }),
        };
        client_for(&server).generate(&request).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "JVBERi0xLjQ=");
        assert_eq!(parts[1]["text"], "Evaluate the attached resume");
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_quota_exhaustion_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&text_request())
            .await
            .unwrap_err();
        match err {
            LlmError::Quota { message } => assert_eq!(message, "Resource exhausted"),
            other => panic!("expected quota error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_key_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Auth { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Blocked { reason } if reason == "SAFETY"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            "k".to_string(),
            "gemini-2.5-flash".to_string(),
            "https://example.test/".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
