use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::{ChatModel, ResponseFormat};

/// Client for an OpenAI-compatible `/chat/completions` endpoint (Groq by default)
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )
    }
}

#[async_trait]
impl ChatModel for ChatCompletionsClient {
    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            response_format: match format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ResponseFormatSpec {
                    kind: "json_object",
                }),
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            ?format,
            "Calling chat completion API"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to call chat completion API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Chat completion API failed with status {}: {}",
                status,
                error_text
            );
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion response contained no message")
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatSpec>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormatSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_request_body() {
        let body = ChatRequest {
            model: "llama-3.1-8b-instant",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            response_format: Some(ResponseFormatSpec {
                kind: "json_object",
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_text_mode_omits_response_format() {
        let body = ChatRequest {
            model: "m",
            messages: vec![],
            response_format: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_parse_chat_response() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Hello!"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ChatCompletionsClient::new(
            "https://api.groq.com/openai/v1/".to_string(),
            "key".to_string(),
            "llama-3.1-8b-instant".to_string(),
        );
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(client.model, "llama-3.1-8b-instant");
    }
}
