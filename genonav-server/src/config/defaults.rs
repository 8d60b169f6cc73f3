//! Default configuration values
//!
//! These are embedded in the binary and used when no config file exists.

/// Default configuration as TOML, written by `--print-config`
pub const DEFAULT_CONFIG_TOML: &str = r##"
# genonav configuration

[server]
listen_addr = "127.0.0.1:8765"
max_frame_bytes = 1048576

[navigation]
# "ucsc" (chr1, chrM) or "ensembl" (1, MT)
default_genome_format = "ucsc"
default_window = 10000
history_default_limit = 5

[channel]
ack_timeout_ms = 5000
wait_for_ack = false
outbound_buffer = 64

[llm]
api_base_url = "https://api.openai.com/v1"
model_name = "gpt-4"
api_key_env = "OPENAI_API_KEY"
temperature = 0.1
request_timeout_secs = 60
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
