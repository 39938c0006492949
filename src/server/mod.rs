pub mod api;

use crate::cli::Args;
use std::error::Error;
use std::net::SocketAddr;
use log::{ info, error };

use self::api::{ build_router, AppState };

pub struct Server {
    addr: String,
    state: AppState,
    args: Args,
}

impl Server {
    pub fn new(addr: String, state: AppState, args: Args) -> Self {
        Self { addr, state, args }
    }

    /// Serves until the listener fails. TLS is used only when enabled and both PEM paths are set.
    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", self.addr, e))?;
        let app = build_router(self.state.clone());

        match (self.args.enable_tls, &self.args.tls_cert_path, &self.args.tls_key_path) {
            (true, Some(cert_path), Some(key_path)) => {
                let tls_config = axum_server::tls_rustls::RustlsConfig
                    ::from_pem_file(cert_path, key_path).await
                    .map_err(|e| format!("Failed to load TLS certificate/key: {}", e))?;

                info!("Starting HTTPS server on: https://{}", addr);
                axum_server::bind_rustls(addr, tls_config)
                    .serve(app.into_make_service())
                    .await
                    .map_err(|e| {
                        error!("HTTPS server error: {}", e);
                        e
                    })?;
            }
            (enable_tls, _, _) => {
                if enable_tls {
                    error!("TLS enabled but TLS_CERT_PATH or TLS_KEY_PATH is missing; serving plain HTTP");
                }
                let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                    format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
                })?;
                info!("Starting HTTP server on: http://{}", addr);
                axum::serve(listener, app.into_make_service()).await?;
            }
        }

        Ok(())
    }
}
