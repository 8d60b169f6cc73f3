//! Tool declaration and invocation types

use genonav_protocol::{DeliveryStatus, GenomicLocation, NavigationAction, ToolResultEntry};
use serde::{Deserialize, Serialize};

/// Tool declaration offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (e.g., "navigate_by_gene")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Provider call id, echoed back in the second model round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tool_name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolInvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: None,
            tool_name: tool_name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Where a successful navigation tool wants the browser to go
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationTarget {
    pub action: NavigationAction,
    pub location: GenomicLocation,
}

/// Outcome of one dispatched tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationResult {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub result_text: String,
    /// Set only when a navigation tool succeeded
    pub navigation: Option<NavigationTarget>,
}

impl ToolInvocationResult {
    /// Wire entry for the `ai_response`, with the command delivery outcome
    pub fn to_entry(&self, delivery: Option<DeliveryStatus>) -> ToolResultEntry {
        ToolResultEntry {
            tool_name: self.tool_name.clone(),
            arguments: self.arguments.clone(),
            result: self.result_text.clone(),
            delivery,
        }
    }
}
