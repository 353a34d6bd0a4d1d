use super::{
    ChatBackend,
    types::{ChatMessage, ChatRequest, ChatResponse},
};
use crate::{config::Config, error::BackendError};
use std::time::Duration;
use tracing::debug;

const NAME: &str = "openai";

/// OpenAI-compatible `/v1/chat/completions` client.
pub struct OpenAiBackend {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    /// Reads the API key from the environment variable named in the config.
    pub fn new(cfg: &Config) -> Result<Self, BackendError> {
        let api_key = std::env::var(&cfg.openai.api_key_env).map_err(|_| {
            BackendError::NotConfigured {
                backend: NAME.into(),
                reason: format!("{} environment variable not set", cfg.openai.api_key_env),
            }
        })?;

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.openai.timeout_seconds))
            .build()
            .map_err(|e| BackendError::NotConfigured {
                backend: NAME.into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_key,
            base_url: cfg.openai.base_url.trim_end_matches('/').to_string(),
            model: cfg.openai.model.clone(),
            temperature: cfg.openai.temperature,
        })
    }
}

impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.temperature,
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| BackendError::Transport {
                backend: NAME.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(BackendError::Status {
                backend: NAME.into(),
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse = resp.json().map_err(|e| BackendError::Malformed {
            backend: NAME.into(),
            reason: e.to_string(),
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendError::Malformed {
                backend: NAME.into(),
                reason: "no choices[0].message.content".into(),
            })?;

        debug!(model = %self.model, chars = content.len(), "chat completion");
        Ok(content.trim().to_string())
    }
}
