//! Language-model gateway.
//!
//! The processor only sees [`LlmGateway`]: two fallible, latency-bearing
//! capabilities, `summarize` and `generate_checklist`. Implementations
//! provide the raw completion call; prompt construction lives here so every
//! backend sends the same instructions.

pub mod openai;
pub mod prompts;

use thiserror::Error;

pub use openai::OpenAiGateway;

/// Errors from a gateway call. The `Display` text is what ends up in the
/// job's `error_message`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("timeout")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("upstream returned an empty response")]
    EmptyResponse,

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Which pipeline stage a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    Checklist,
}

/// A single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub stage: Stage,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Token limits and sampling temperature used for the two stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSettings {
    pub summary_max_tokens: u32,
    pub checklist_max_tokens: u32,
    pub temperature: f32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            summary_max_tokens: 500,
            checklist_max_tokens: 800,
            temperature: 0.3,
        }
    }
}

pub trait LlmGateway: Send + Sync {
    /// Sends one prompt and returns the trimmed text of the reply.
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;

    fn prompt_settings(&self) -> PromptSettings {
        PromptSettings::default()
    }

    /// Stage one: a concise summary of the guideline text.
    fn summarize(&self, text: &str) -> Result<String, GatewayError> {
        let settings = self.prompt_settings();
        self.complete(&CompletionRequest {
            stage: Stage::Summary,
            prompt: prompts::summary_prompt(text),
            max_tokens: settings.summary_max_tokens,
            temperature: settings.temperature,
        })
    }

    /// Stage two: the raw checklist reply for a summary. Parsing is the
    /// caller's job.
    fn generate_checklist(&self, summary: &str) -> Result<String, GatewayError> {
        let settings = self.prompt_settings();
        self.complete(&CompletionRequest {
            stage: Stage::Checklist,
            prompt: prompts::checklist_prompt(summary),
            max_tokens: settings.checklist_max_tokens,
            temperature: settings.temperature,
        })
    }
}
