//! OpenAI-compatible chat-completions backend.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, GatewayError, LlmGateway, PromptSettings};
use crate::config::LlmConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Blocking client for `{base_url}/chat/completions`.
///
/// Must be built and dropped outside of an async runtime.
pub struct OpenAiGateway {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    settings: PromptSettings,
}

impl OpenAiGateway {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<SecretString>,
        timeout: Duration,
        settings: PromptSettings,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
            settings,
        })
    }

    pub fn from_config(config: &LlmConfig, api_key: Option<SecretString>) -> Result<Self, GatewayError> {
        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
            PromptSettings {
                summary_max_tokens: config.summary_max_tokens,
                checklist_max_tokens: config.checklist_max_tokens,
                temperature: config.temperature,
            },
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LlmGateway for OpenAiGateway {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        log::debug!(
            "Sending {:?} completion ({} prompt chars) to {}",
            request.stage,
            request.prompt.len(),
            self.endpoint
        );

        let response = builder.send().map_err(classify_transport_error)?;
        let status = response.status();
        let text = response.text().map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        extract_content(&text)
    }

    fn prompt_settings(&self) -> PromptSettings {
        self.settings.clone()
    }
}

fn classify_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::Unavailable(e.to_string())
    } else {
        GatewayError::Transport(e.to_string())
    }
}

/// Pulls the first choice's message text out of a chat-completions body.
fn extract_content(body: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(GatewayError::EmptyResponse)?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}
