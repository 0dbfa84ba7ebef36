pub mod client;
pub mod scripted;

pub use client::ChatCompletionsClient;
pub use scripted::ScriptedModel;

use anyhow::Result;
use async_trait::async_trait;

/// Shape the provider is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    /// Provider-side JSON mode; the reply must be a single JSON object
    JsonObject,
}

/// A hosted chat-completion model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one user prompt and return the reply text
    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String>;
}

/// Strip Markdown code fences some models wrap around JSON replies
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an info string such as `json`
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
