//! Remote chat service client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voicebot_core::{ReplyMetadata, SessionIdentity, View};

use crate::error::ChatError;

/// Body of one chat service call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub text: String,
    pub language_tag: String,
    pub session_identity: SessionIdentity,
    pub context: RequestContext,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,
    pub current_view: View,
}

/// Reply from the chat service.
///
/// Field aliases accept the older `intent`/`suggestions` names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    #[serde(default, alias = "intent")]
    pub intent_label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default, alias = "suggestions")]
    pub suggested_replies: Option<Vec<String>>,
}

impl ChatReply {
    /// Reject replies the session cannot render.
    pub fn validate(self) -> Result<Self, ChatError> {
        if self.response.trim().is_empty() {
            return Err(ChatError::MalformedReply("empty response".to_string()));
        }
        if let Some(c) = self.confidence {
            if !(0.0..=1.0).contains(&c) {
                return Err(ChatError::MalformedReply(format!(
                    "confidence {} outside [0, 1]",
                    c
                )));
            }
        }
        Ok(self)
    }

    /// Non-empty suggestions, in order.
    pub fn suggestions(&self) -> Vec<String> {
        self.suggested_replies
            .iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn metadata(&self) -> ReplyMetadata {
        ReplyMetadata {
            intent_label: self.intent_label.clone(),
            confidence: self.confidence,
            suggested_replies: self.suggestions(),
        }
    }
}

/// The remote intelligence service.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// JSON-over-HTTP chat client.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatClient {
    /// Build a client posting to `endpoint`. `timeout` bounds each request.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Network`] if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let reply: ChatReply = serde_json::from_slice(&body)
            .map_err(|e| ChatError::MalformedReply(e.to_string()))?;
        reply.validate()
    }
}
