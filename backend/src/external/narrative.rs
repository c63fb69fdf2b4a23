//! Narrative text-generation client
//!
//! Client for an OpenAI-compatible chat completions API used to write
//! water availability predictions and answer free-form questions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::NarrativeConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One message of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Remote text-generation boundary
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    /// Send the conversation and return the text of the first reply.
    ///
    /// Fails with [`AppError::RemoteService`] on transport errors, timeouts,
    /// non-success statuses, or a reply without text content.
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Chat completions request body
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if it carries any
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
    }
}

/// HTTP client for the chat completions API
#[derive(Clone)]
pub struct NarrativeClient {
    base_url: String,
    api_key: String,
    model: String,
    http_client: Client,
}

impl NarrativeClient {
    /// Create a new client with the configured endpoint, model and timeout
    pub fn new(config: &NarrativeConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl NarrativeBackend for NarrativeClient {
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::RemoteService("API key not configured".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RemoteService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RemoteService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::RemoteService(format!("Failed to parse response: {}", e)))?;

        completion
            .into_content()
            .ok_or_else(|| AppError::RemoteService("Invalid AI response format".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "chat-completions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hello")];
        let json = serde_json::to_value(CompletionRequest {
            model: "inflection_3_pi",
            messages: &messages,
        })
        .unwrap();

        assert_eq!(json["model"], "inflection_3_pi");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_first_choice_content() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Levels are stable."}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_content().as_deref(), Some("Levels are stable."));
    }

    #[test]
    fn test_missing_content_is_none() {
        for body in [
            r#"{"choices": []}"#,
            r#"{}"#,
            r#"{"choices": [{"message": {"content": ""}}]}"#,
            r#"{"choices": [{"finish_reason": "length"}]}"#,
        ] {
            let response: CompletionResponse = serde_json::from_str(body).unwrap();
            assert!(response.into_content().is_none(), "{}", body);
        }
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_without_calling_out() {
        let client = NarrativeClient::new(&NarrativeConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: String::new(),
            model: "inflection_3_pi".to_string(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteService(_)));
    }
}
