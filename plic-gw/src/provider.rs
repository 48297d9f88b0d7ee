//! External AI provider client
//!
//! Speaks the OpenAI-compatible chat completions protocol (OpenRouter by
//! default). One call sends one user turn holding the review prompt and the
//! image; the reply text is returned unparsed.
//!
//! No retry and no rate limiting: a failed call is reported to the caller.

use plic_common::config::ProviderConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::AnalysisError;

const USER_AGENT: &str = concat!("plic-gw/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an upstream error body kept in logs
const MAX_LOGGED_BODY: usize = 2000;

// ========================================
// Wire types
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Usually a string; some providers send an array of content parts
    #[serde(default)]
    pub content: Option<Value>,
}

impl ChatCompletionResponse {
    /// Text of the first choice
    pub fn first_text(&self) -> Option<String> {
        let content = self.choices.first()?.message.content.as_ref()?;
        match content {
            Value::String(text) => Some(text.clone()),
            Value::Array(parts) => {
                let text: String = parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect();
                Some(text)
            }
            _ => None,
        }
    }
}

// ========================================
// Client
// ========================================

/// Chat completions client
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    referer: String,
    title: String,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the single-turn request body
    pub fn build_request<'a>(&'a self, prompt: &'a str, image_url: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Send one completion request and return the reply text
    pub async fn complete(
        &self,
        api_key: &str,
        prompt: &str,
        image_url: &str,
    ) -> Result<String, AnalysisError> {
        let body = self.build_request(prompt, image_url);

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Provider request failed");
                AnalysisError::Upstream {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let logged: String = error_text.chars().take(MAX_LOGGED_BODY).collect();
            tracing::error!(
                status_code = status.as_u16(),
                body = %logged,
                "Provider returned error status"
            );
            return Err(AnalysisError::Upstream {
                status: Some(status.as_u16()),
                message: logged,
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Provider response is not a chat completion");
            AnalysisError::Parse(format!("Provider response is not a chat completion: {}", e))
        })?;

        completion
            .first_text()
            .ok_or_else(|| AnalysisError::Parse("Provider response has no message content".to_string()))
    }
}
