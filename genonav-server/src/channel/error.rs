//! Command channel errors

/// Failure to hand a navigation command to the connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The connection is closing or its writer has stopped
    #[error("Connection closed")]
    ConnectionClosed,

    /// Envelope could not be transmitted
    #[error("Send failed: {0}")]
    SendFailed(String),
}
