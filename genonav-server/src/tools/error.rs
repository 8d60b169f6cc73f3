//! Tool dispatch errors
//!
//! These never leave the dispatcher as errors; they are rendered into the
//! tool result text the model sees.

/// Tool dispatch errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Unknown tool
    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    /// Missing or mistyped argument
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

impl ToolError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Text returned to the model in place of a result
    pub fn to_result_text(&self, tool_name: &str) -> String {
        match self {
            Self::UnknownTool(_) => self.to_string(),
            other => format!("Error executing tool '{}': {}", tool_name, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_text() {
        assert_eq!(
            ToolError::UnknownTool("zoom".into()).to_result_text("zoom"),
            "Tool 'zoom' not found"
        );
        assert_eq!(
            ToolError::invalid_params("Missing 'start' parameter")
                .to_result_text("navigate_by_coordinate"),
            "Error executing tool 'navigate_by_coordinate': Invalid parameters: Missing 'start' parameter"
        );
    }
}
