//! Minimal client for OpenAI-compatible chat completion APIs (x.ai Grok by default).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ScoringError;
use crate::config::LlmConfig;

/// One message of a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: SecretString,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: 0.0,
            api_key,
        }
    }

    /// Builds a client from config, or `None` when no credential is configured.
    pub fn from_config(config: LlmConfig) -> Option<Self> {
        let api_key = config.api_key?;
        Some(Self::new(config.base_url, config.model, api_key).with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat request and return the first choice's text, trimmed.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ScoringError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
        };
        debug!(model = %self.model, messages = messages.len(), "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoringError::Status { status, body });
        }

        let body = response.text().await?;
        let data: ChatResponse = serde_json::from_str(&body)?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ScoringError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("rules"), ChatMessage::user("Bitcoin, BTC")];
        let request = ChatRequest {
            model: "grok-2-latest",
            temperature: 0.0,
            messages: &messages,
        };
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "grok-2-latest");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Bitcoin, BTC");
    }

    #[test]
    fn test_response_with_null_content() {
        let data: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(data.choices[0].message.content.is_none());
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(ChatClient::from_config(LlmConfig::default()).is_none());

        let config = LlmConfig {
            api_key: Some(SecretString::from("xai-test".to_string())),
            ..Default::default()
        };
        let client = ChatClient::from_config(config).expect("client with key");
        assert_eq!(client.model(), "grok-2-latest");
        assert_eq!(client.base_url, "https://api.x.ai/v1");
    }
}
