//! Text-completion boundary for model-backed extraction

use crate::error::ExtractError;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for pluggable completion backends: prompt in, completion text out
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Canned(String),
    Status(u16),
    Empty,
}

/// Mock completion backend for testing
pub struct MockCompletion {
    behavior: MockBehavior,
    delay: Option<Duration>,
}

impl MockCompletion {
    /// Always answers with `text`
    pub fn canned(text: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Canned(text.into()),
            delay: None,
        }
    }

    /// Always fails as if the service answered with HTTP `status`
    pub fn failing(status: u16) -> Self {
        Self {
            behavior: MockBehavior::Status(status),
            delay: None,
        }
    }

    /// Always answers with an envelope carrying no text
    pub fn empty() -> Self {
        Self {
            behavior: MockBehavior::Empty,
            delay: None,
        }
    }

    /// Wait `delay` before answering
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    fn name(&self) -> &'static str {
        "mock_completion"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ExtractError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            MockBehavior::Canned(text) => Ok(text.clone()),
            MockBehavior::Status(status) => Err(ExtractError::Status {
                status: *status,
                body: "mock failure".to_string(),
            }),
            MockBehavior::Empty => Err(ExtractError::EmptyCompletion),
        }
    }
}
