pub mod answer;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod llm;
pub mod models;
pub mod router;
pub mod search;
pub mod server;
pub mod transport;
pub mod upstream;

use catalog::ServiceCatalog;
use cli::Args;
use log::info;
use server::api::AppState;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Mode: {}", args.mode);
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Timeout: {}s", args.chat_timeout_secs);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Forward URL: {}", args.forward_url.as_deref().unwrap_or("-"));
    info!("Forward Timeout: {}s", args.forward_timeout_secs);
    info!("Health Timeout: {}s", args.health_timeout_secs);
    info!(
        "Upstream Retries: {} (backoff {}ms)",
        args.upstream_max_retries,
        args.upstream_retry_backoff_ms
    );
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let catalog = Arc::new(ServiceCatalog::builtin());
    info!("Loaded {} government services", catalog.len());

    let handler = handler::build_handler(&args, catalog.clone())?;
    let state = AppState { handler, catalog };

    let server = Server::new(args.server_addr.clone(), state, args.clone());
    server.run().await?;

    Ok(())
}
