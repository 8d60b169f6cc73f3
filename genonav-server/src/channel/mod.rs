//! Correlated navigation commands over the client connection
//!
//! Each successful navigation produces one command with a fresh correlation
//! id. The command stays pending until the client acknowledges it, the
//! acknowledgement window closes, or the connection goes away.

mod error;
mod manager;
mod pending;

pub use error::ChannelError;
pub use manager::CommandChannel;
pub use pending::{CommandResolution, CommandState, PendingCommand, PendingRegistry};

/// Substrings that mark a tool result as a failure, matched case-insensitively
pub const FAILURE_INDICATORS: [&str; 3] = ["failed", "error", "not found"];

/// Whether a tool result text reads as a failure
///
/// This is a last guard on top of the structured navigation target: a
/// result that mentions any indicator never produces a command, even if a
/// location was attached. A successful result that legitimately contains
/// one of these words (a gene symbol, say) is suppressed too.
pub fn indicates_failure(text: &str) -> bool {
    let lower = text.to_lowercase();
    FAILURE_INDICATORS.iter().any(|needle| lower.contains(needle))
}
