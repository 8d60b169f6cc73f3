//! Configuration schema structs

use genonav_protocol::{ChromosomeConvention, MAX_FRAME_SIZE};
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub navigation: NavigationConfig,
    pub channel: ChannelConfig,
    pub llm: LlmConfig,
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the TCP listener binds to
    pub listen_addr: String,
    /// Largest accepted frame in bytes, either direction
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8765".into(),
            max_frame_bytes: MAX_FRAME_SIZE,
        }
    }
}

/// Navigation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Convention used when a tool call omits `genome_format`
    pub default_genome_format: ChromosomeConvention,
    /// Window in bp added to `start` when no end is given
    pub default_window: u64,
    /// Entries returned by `get_navigation_history` without a limit
    pub history_default_limit: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_genome_format: ChromosomeConvention::Ucsc,
            default_window: 10_000,
            history_default_limit: 5,
        }
    }
}

/// Command channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// How long a navigation command stays pending
    pub ack_timeout_ms: u64,
    /// Hold the query until the client acknowledges (or the timeout fires)
    pub wait_for_ack: bool,
    /// Capacity of the per-connection outbound queue
    pub outbound_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: 5_000,
            wait_for_ack: false,
            outbound_buffer: 64,
        }
    }
}

/// Model defaults, overridable per query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base_url: String,
    pub model_name: String,
    /// Environment variable holding the fallback API key
    pub api_key_env: String,
    pub temperature: f32,
    /// Replaces the built-in system prompt when set
    pub system_prompt: Option<String>,
    /// HTTP timeout for one model call
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com/v1".into(),
            model_name: "gpt-4".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.1,
            system_prompt: None,
            request_timeout_secs: 60,
        }
    }
}
