//! Model invocation errors

/// Errors from a language model call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// No API key in the query config or the environment
    #[error("missing_api_key")]
    MissingApiKey,

    /// Transport failure or non-success HTTP status
    #[error("{provider} request failed (status {status}): {message}")]
    RequestFailed {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Response arrived but could not be understood
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

impl LlmError {
    pub fn request_failed(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider,
            message: message.into(),
        }
    }
}
