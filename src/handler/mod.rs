pub mod forward;
pub mod local;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::answer::LlmAnswerGenerator;
use crate::catalog::ServiceCatalog;
use crate::cli::Args;
use crate::config::prompt;
use crate::error::ChatError;
use crate::llm::chat::new_client as new_chat_client;
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::{ ChatRequest, ResponseEnvelope };
use crate::router::QueryRouter;
use crate::search::StaticWebSearch;
use crate::upstream::CallPolicy;
use self::forward::ForwardHandler;
use self::local::LocalHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Forward,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Mode::Local),
            "forward" | "forwarding" => Ok(Mode::Forward),
            _ => Err(format!("Unsupported mode: '{}' (expected 'local' or 'forward')", s)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Forward => write!(f, "forward"),
        }
    }
}

/// What `/chat` sends back on success. Serialized without a wrapper, so both
/// variants look the same to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Envelope(ResponseEnvelope),
    Passthrough(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Connected,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub remote: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn new(remote: &str, error: Option<String>) -> Self {
        Self {
            status: if error.is_none() { HealthStatus::Connected } else { HealthStatus::Failed },
            remote: remote.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            error,
        }
    }
}

/// Strategy behind `/chat`, chosen once at startup.
#[async_trait]
pub trait ChatHandler: Send + Sync {
    /// `request` has already passed `ChatRequest::validate`.
    async fn handle(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;

    /// Connectivity probe. `None` when the variant has no remote to check.
    async fn health(&self) -> Option<HealthReport> {
        None
    }

    fn mode(&self) -> Mode;
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

fn retry_policy(args: &Args, timeout_secs: u64) -> CallPolicy {
    CallPolicy::new(secs(timeout_secs)).with_retries(
        args.upstream_max_retries,
        Duration::from_millis(args.upstream_retry_backoff_ms)
    )
}

fn build_local(
    args: &Args,
    catalog: Arc<ServiceCatalog>
) -> Result<Arc<dyn ChatHandler>, Box<dyn Error + Send + Sync>> {
    let llm_type: LlmType = args.chat_llm_type
        .parse()
        .map_err(|e| format!("Invalid chat LLM type: {}", e))?;
    let chat_config = LlmConfig {
        llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
    };
    if llm_type.requires_api_key() && chat_config.api_key.is_none() {
        return Err(format!("CHAT_API_KEY is required when CHAT_LLM_TYPE is '{}'", llm_type).into());
    }
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={}",
        llm_type,
        chat_client.get_model(),
        chat_client.get_base_url().as_deref().unwrap_or("adapter default")
    );

    let prompts = prompt::load_prompts(args.prompts_path.as_deref())?;
    let answers = LlmAnswerGenerator::new(
        chat_client,
        prompts,
        retry_policy(args, args.chat_timeout_secs)
    );
    let router = QueryRouter::new(catalog, Arc::new(StaticWebSearch), Arc::new(answers));
    Ok(Arc::new(LocalHandler::new(router)))
}

fn build_forward(args: &Args) -> Result<Arc<dyn ChatHandler>, Box<dyn Error + Send + Sync>> {
    let url = args.forward_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or("FORWARD_URL is required in forward mode")?;
    let url = url::Url::parse(url).map_err(|e| format!("Invalid FORWARD_URL '{}': {}", url, e))?;
    info!("Forwarding chat requests to: {}", url);

    let handler = ForwardHandler::new(
        url.to_string(),
        retry_policy(args, args.forward_timeout_secs),
        CallPolicy::new(secs(args.health_timeout_secs))
    )?;
    Ok(Arc::new(handler))
}

pub fn build_handler(
    args: &Args,
    catalog: Arc<ServiceCatalog>
) -> Result<Arc<dyn ChatHandler>, Box<dyn Error + Send + Sync>> {
    match args.mode.parse::<Mode>()? {
        Mode::Local => build_local(args, catalog),
        Mode::Forward => build_forward(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["mycity-assistant"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("LOCAL".parse::<Mode>(), Ok(Mode::Local));
        assert_eq!("forwarding".parse::<Mode>(), Ok(Mode::Forward));
        assert!("proxy".parse::<Mode>().is_err());
    }

    #[test]
    fn forward_mode_requires_a_valid_url() {
        let catalog = Arc::new(ServiceCatalog::builtin());
        assert!(build_handler(&args(&["--mode", "forward"]), catalog.clone()).is_err());
        assert!(build_handler(&args(&["--mode", "forward", "--forward-url", "not a url"]), catalog.clone()).is_err());

        let handler = build_handler(
            &args(&["--mode", "forward", "--forward-url", "http://127.0.0.1:9/chat"]),
            catalog
        ).unwrap();
        assert_eq!(handler.mode(), Mode::Forward);
    }

    #[test]
    fn local_mode_needs_key_for_hosted_llm() {
        let catalog = Arc::new(ServiceCatalog::builtin());
        assert!(build_handler(&args(&["--chat-api-key", ""]), catalog.clone()).is_err());

        let handler = build_handler(&args(&["--chat-llm-type", "ollama"]), catalog).unwrap();
        assert_eq!(handler.mode(), Mode::Local);
    }

    #[test]
    fn health_report_status_follows_error() {
        assert_eq!(HealthReport::new("http://r", None).status, HealthStatus::Connected);
        let failed = HealthReport::new("http://r", Some("refused".into()));
        assert_eq!(failed.status, HealthStatus::Failed);
        assert_eq!(serde_json::to_value(&failed).unwrap()["status"], "failed");
    }
}
