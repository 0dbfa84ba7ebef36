use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::{ChatModel, ResponseFormat};

/// In-process model that replays queued replies and records every prompt.
///
/// Used for tests and offline development. An empty queue is an error, as is a
/// queued `Err`, so provider failures can be simulated too.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<(String, ResponseFormat)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        for reply in replies {
            model.push_reply(reply);
        }
        model
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.lock_replies().push_back(Err(message.into()));
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<(String, ResponseFormat)> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }

    fn lock_replies(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<std::result::Result<String, String>>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((prompt.to_string(), format));

        match self.lock_replies().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => anyhow::bail!("Scripted provider error: {}", message),
            None => anyhow::bail!("Scripted model has no reply queued"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_and_records_prompts() {
        let model = ScriptedModel::with_replies(["first", "second"]);

        assert_eq!(model.complete("a", ResponseFormat::Text).await.unwrap(), "first");
        assert_eq!(
            model.complete("b", ResponseFormat::JsonObject).await.unwrap(),
            "second"
        );
        assert!(model.complete("c", ResponseFormat::Text).await.is_err());

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[1], ("b".to_string(), ResponseFormat::JsonObject));
    }

    #[tokio::test]
    async fn test_queued_error() {
        let model = ScriptedModel::new();
        model.push_error("rate limited");
        let err = model.complete("a", ResponseFormat::Text).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }
}
