use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Deployment Args ---
    /// How /chat is served: "local" runs the query pipeline in-process, "forward" relays requests to FORWARD_URL.
    #[arg(long, env = "MODE", default_value = "local")]
    pub mode: String,

    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    // --- Chat LLM Provider Args (local mode) ---
    /// Type of LLM provider for answer generation (cerebras, openai, groq, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "cerebras")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., https://api.cerebras.ai/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for answer generation (e.g., qwen-3-235b-a22b-instruct-2507, gpt-4o, llama3)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Timeout in seconds for a single completion call.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "30")]
    pub chat_timeout_secs: u64,

    /// Optional JSON file overriding the built-in system preamble and answer template.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- Forwarding Args (forward mode) ---
    /// Remote chat endpoint that receives every validated /chat request in forward mode.
    #[arg(long, env = "FORWARD_URL")]
    pub forward_url: Option<String>,

    /// Timeout in seconds for a forwarded chat request.
    #[arg(long, env = "FORWARD_TIMEOUT_SECS", default_value = "30")]
    pub forward_timeout_secs: u64,

    /// Timeout in seconds for the /health connectivity probe.
    #[arg(long, env = "HEALTH_TIMEOUT_SECS", default_value = "10")]
    pub health_timeout_secs: u64,

    // --- Outbound Retry Args ---
    /// Extra attempts made after a failed outbound call. 0 disables retries.
    #[arg(long, env = "UPSTREAM_MAX_RETRIES", default_value = "0")]
    pub upstream_max_retries: u32,

    /// Delay in milliseconds before the first retry; grows linearly with each attempt.
    #[arg(long, env = "UPSTREAM_RETRY_BACKOFF_MS", default_value = "500")]
    pub upstream_retry_backoff_ms: u64,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format) for serving HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for serving HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_local_mode_without_retries() {
        let args = Args::try_parse_from(["mycity-assistant"]).unwrap();
        assert_eq!(args.mode, "local");
        assert_eq!(args.chat_timeout_secs, 30);
        assert_eq!(args.health_timeout_secs, 10);
        assert_eq!(args.upstream_max_retries, 0);
    }

    #[test]
    fn forward_flags_parse() {
        let args = Args::try_parse_from([
            "mycity-assistant",
            "--mode",
            "forward",
            "--forward-url",
            "http://remote.example/chat",
        ])
        .unwrap();
        assert_eq!(args.mode, "forward");
        assert_eq!(args.forward_url.as_deref(), Some("http://remote.example/chat"));
    }
}
