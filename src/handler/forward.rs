use async_trait::async_trait;
use log::{ info, warn };
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::error::Error;
use uuid::Uuid;

use super::{ ChatHandler, ChatReply, HealthReport, Mode };
use crate::error::{ ChatError, UpstreamError };
use crate::models::chat::ChatRequest;
use crate::upstream::{ self, CallPolicy };

const HEALTH_PROBE_TEXT: &str = "ping";

/// Relays every validated request to a remote chat endpoint and returns its body untouched.
pub struct ForwardHandler {
    http: HttpClient,
    url: String,
    policy: CallPolicy,
    health_policy: CallPolicy,
}

impl ForwardHandler {
    pub fn new(
        url: String,
        policy: CallPolicy,
        health_policy: CallPolicy
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + Sync>)?;
        Ok(Self { http, url, policy, health_policy })
    }

    async fn post(&self, policy: &CallPolicy, label: &str, request: &ChatRequest) -> upstream::Attempted<Value> {
        let http = &self.http;
        let url = self.url.as_str();
        upstream::call(policy, label, move || async move {
            let resp = http.post(url).json(request).send().await?.error_for_status()?;
            let body = resp.json::<Value>().await?;
            Ok::<_, UpstreamError>(body)
        }).await
    }
}

#[async_trait]
impl ChatHandler for ForwardHandler {
    async fn handle(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        info!("Forwarding {:?} request for session '{}'", request.kind, request.session_id);
        let (body, _) = self.post(&self.policy, "forward", request).await.into_chat_result()?;
        Ok(ChatReply::Passthrough(body))
    }

    async fn health(&self) -> Option<HealthReport> {
        let probe = ChatRequest::text(format!("health-{}", Uuid::new_v4()), HEALTH_PROBE_TEXT);
        let attempted = self.post(&self.health_policy, "health check", &probe).await;
        let error = attempted.result.err().map(|e| {
            warn!("Health check against {} failed: {}", self.url, e);
            e.to_string()
        });
        Some(HealthReport::new(&self.url, error))
    }

    fn mode(&self) -> Mode {
        Mode::Forward
    }
}
