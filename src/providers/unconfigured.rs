use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AdspotError, Result};
use crate::interfaces::providers::{LlmProvider, LlmResponse};

/// Stands in for the model when no API key is configured, so the map and
/// analytics views keep working and every chat turn explains why it failed.
#[derive(Debug, Clone)]
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    async fn generate_with_tools(
        &self,
        _prompt: &str,
        _system_prompt: &str,
        _tools: Vec<Value>,
    ) -> Result<LlmResponse> {
        Err(AdspotError::Config(self.reason.clone()))
    }
}
