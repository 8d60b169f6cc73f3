//! Language model seam
//!
//! The daemon only needs one capability from a model: given a system
//! prompt, the conversation so far and the declared tools, return text or
//! a list of tool calls. [`LanguageModel`] is that capability;
//! [`ModelProvider`] picks an implementation per query.

mod error;
mod offline;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use genonav_protocol::{ModelConfig, TEST_API_KEY};
use tracing::debug;

use crate::config::LlmConfig;
use crate::tools::{Tool, ToolInvocationRequest};

pub use error::LlmError;
pub use offline::OfflineModel;
pub use openai::{OpenAiChatModel, OpenAiClient};

/// Speaker of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    /// Result of a tool call, answering an assistant's request
    Tool,
}

/// One message of the model-facing conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Calls requested by an assistant message
    pub tool_calls: Vec<ToolInvocationRequest>,
    /// Call answered by a tool message
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant_with_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolInvocationRequest>,
    ) -> Self {
        Self {
            tool_calls,
            ..Self::assistant(content)
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// What the model answered; empty `tool_calls` means plain text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub tool_calls: Vec<ToolInvocationRequest>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolInvocationRequest>) -> Self {
        Self {
            text: String::new(),
            tool_calls,
        }
    }
}

/// A tool-aware chat model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Label reported as `model_used`
    fn model_used(&self) -> String;

    fn is_test_mode(&self) -> bool {
        false
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
        tools: &[Tool],
    ) -> Result<ModelReply, LlmError>;
}

/// Chooses the model for a query from its optional overrides
pub trait ModelProvider: Send + Sync {
    fn resolve(&self, overrides: Option<&ModelConfig>) -> Result<Arc<dyn LanguageModel>, LlmError>;
}

/// Provider backed by the `[llm]` config section
///
/// Per-query overrides win over config; the API key falls back to the
/// environment variable named by `api_key_env`, read once at startup.
#[derive(Debug, Clone)]
pub struct ConfiguredModels {
    config: LlmConfig,
    fallback_key: Option<String>,
}

impl ConfiguredModels {
    pub fn new(config: LlmConfig, fallback_key: Option<String>) -> Self {
        Self {
            config,
            fallback_key: fallback_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_env(config: LlmConfig) -> Self {
        let fallback_key = std::env::var(&config.api_key_env).ok();
        Self::new(config, fallback_key)
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ModelProvider for ConfiguredModels {
    fn resolve(&self, overrides: Option<&ModelConfig>) -> Result<Arc<dyn LanguageModel>, LlmError> {
        let api_key = non_empty(overrides.and_then(|o| o.api_key.as_ref()))
            .or(self.fallback_key.as_deref())
            .ok_or(LlmError::MissingApiKey)?;
        let model_name = non_empty(overrides.and_then(|o| o.model_name.as_ref()))
            .unwrap_or(self.config.model_name.as_str());

        if api_key == TEST_API_KEY {
            debug!(model = model_name, "Using offline test model");
            return Ok(Arc::new(OfflineModel::new(model_name)));
        }

        let base_url = non_empty(overrides.and_then(|o| o.api_base_url.as_ref()))
            .unwrap_or(self.config.api_base_url.as_str());
        let model = OpenAiChatModel::new(
            base_url,
            api_key,
            model_name,
            self.config.temperature,
            Duration::from_secs(self.config.request_timeout_secs),
        )?;
        Ok(Arc::new(model))
    }
}
