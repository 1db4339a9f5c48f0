// model.rs - Text completion model seam and the chat-completions client.
//
// Flows only need "system prompt + user prompt in, text out". The
// `CompletionModel` trait is that seam; `OpenAiModel` implements it over the
// OpenAI-compatible `/chat/completions` endpoint with a blocking client.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{FeedbackError, Result};

/// Anything that can turn a prompt pair into free-form text.
pub trait CompletionModel {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

impl<M: CompletionModel + ?Sized> CompletionModel for &M {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        (**self).complete(system_prompt, user_prompt)
    }
}

impl<M: CompletionModel + ?Sized> CompletionModel for Box<M> {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        (**self).complete(system_prompt, user_prompt)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions API.
pub struct OpenAiModel {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiModel {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Build a client from config, reading the key from `api_key_env`.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FeedbackError::MissingApiKey {
                var: config.api_key_env.clone(),
            })?;
        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            config.name.clone(),
            config.temperature,
        ))
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionModel for OpenAiModel {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = user_prompt.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FeedbackError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| FeedbackError::ModelResponse(e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FeedbackError::ModelResponse("response had no choices".to_string()))?;

        tracing::debug!(response_chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_as_chat_completion() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["temperature"], 0.5);
    }

    #[test]
    fn response_extracts_first_choice() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Epic: A"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Epic: A")
        );
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let model = OpenAiModel::new("http://localhost:8080/v1/", "k", "m", 0.0);
        assert_eq!(model.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(model.model_name(), "m");
    }

    #[test]
    fn missing_key_is_typed_error() {
        let config = ModelConfig {
            api_key_env: "AGILITY_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ModelConfig::default()
        };
        let err = OpenAiModel::from_config(&config).err().unwrap();
        assert!(matches!(
            err,
            FeedbackError::MissingApiKey { ref var } if var == "AGILITY_TEST_KEY_THAT_IS_NEVER_SET"
        ));
    }
}
