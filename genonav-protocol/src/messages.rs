//! Client-server message types
//!
//! Every message is a JSON object tagged by its `type` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::*;

// ==================== Navigation Commands ====================

/// What the browser should do with a navigation payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    /// Jump to explicit coordinates
    NavigateToLocation,
    /// Jump to a gene resolved by symbol
    NavigateToGene,
}

/// Correlated navigation command sent to the browser client
///
/// The payload carries both chromosome conventions so the client never has
/// to re-normalize. The client answers with a [`NavigationAck`] echoing
/// `correlation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationCommand {
    pub action: NavigationAction,
    pub correlation_id: CorrelationId,
    pub payload: GenomicLocation,
    pub timestamp: DateTime<Utc>,
}

impl NavigationCommand {
    /// Build a command with a fresh correlation id stamped now
    pub fn new(action: NavigationAction, payload: GenomicLocation) -> Self {
        Self {
            action,
            correlation_id: CorrelationId::new(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Browser acknowledgement of a navigation command
///
/// The id is kept as the raw string the client sent; anything that does not
/// parse as a correlation id simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationAck {
    #[serde(alias = "requestId")]
    pub correlation_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NavigationAck {
    pub fn new(correlation_id: CorrelationId, status: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            status: status.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ==================== AI Responses ====================

/// Final answer to an `ai_query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub content: String,
    pub model_used: String,
    #[serde(default)]
    pub tool_results: Vec<ToolResultEntry>,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ==================== Messages ====================

/// Messages sent from the browser client to the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Natural-language request, optionally with prior turns
    AiQuery {
        query: String,
        #[serde(default)]
        messages: Vec<ConversationTurn>,
        #[serde(default)]
        ai_model_config: Option<ModelConfig>,
    },

    /// Check that the configured model answers at all
    TestConnection {
        #[serde(default)]
        config: ModelConfig,
    },

    /// Acknowledgement for a navigation command
    NavigationResponse(NavigationAck),

    /// Keepalive
    Ping,
}

/// Messages sent from the daemon to the browser client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Answer to an `ai_query`
    AiResponse {
        response: AiResponse,
        timestamp: DateTime<Utc>,
    },

    /// Correlated navigation command
    Navigation(NavigationCommand),

    /// Outcome of a `test_connection`
    TestConnectionResult { success: bool, message: String },

    /// Request-level failure (malformed frame, internal error)
    Error { message: String },

    /// Keepalive response
    Pong,
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
