//! Model configuration and conversation types carried by `ai_query`

use serde::{Deserialize, Serialize};

/// API key that selects the offline test model
pub const TEST_API_KEY: &str = "test-key";

/// Per-query model settings supplied by the browser client
///
/// Every field is optional on the wire; the daemon fills gaps from its
/// own `[llm]` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl ModelConfig {
    /// Whether the client asked for the offline test model
    pub fn is_test_mode(&self) -> bool {
        self.api_key.as_deref() == Some(TEST_API_KEY)
    }
}

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A prior turn of the user-visible conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_camel_case() {
        let json = r#"{"apiBaseUrl":"https://api.openai.com/v1","apiKey":"sk-1","modelName":"gpt-4"}"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("https://api.openai.com/v1"));
        assert_eq!(config.model_name.as_deref(), Some("gpt-4"));
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_model_config_partial() {
        let config: ModelConfig = serde_json::from_str(r#"{"apiKey":"test-key"}"#).unwrap();
        assert!(config.is_test_mode());
        assert!(config.model_name.is_none());
    }

    #[test]
    fn test_conversation_turn_roles() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(turn, ConversationTurn::assistant("hi"));
    }
}
