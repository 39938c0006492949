use crate::catalog::ServiceCatalog;
use crate::error::ChatError;
use crate::handler::{ ChatHandler, ChatReply };
use crate::models::chat::{ ChatRequest, ErrorEnvelope, Meta };
use crate::models::transport::JourneyRequest;
use crate::transport;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, Path, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde_json::{ json, Value };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<dyn ChatHandler>,
    pub catalog: Arc<ServiceCatalog>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .route("/services", get(list_services_handler))
        .route("/services/{id}", get(service_detail_handler))
        .route("/journey", post(journey_handler))
        .route("/transport/status", get(transport_status_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, error: String, meta: Meta) -> Response {
    (status, Json(ErrorEnvelope { error, meta })).into_response()
}

fn status_for(err: &ChatError) -> StatusCode {
    match err {
        ChatError::Validation(_) => StatusCode::BAD_REQUEST,
        ChatError::NotFound { .. } => StatusCode::NOT_FOUND,
        ChatError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    }
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "MyCity AI Assistant Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Malaysian Government Services AI Assistant",
        "mode": state.handler.mode().to_string(),
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected /chat body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text(), Meta::default());
        }
    };

    let request = match serde_json::from_value::<ChatRequest>(body.clone()) {
        Ok(request) => request,
        Err(e) => {
            warn!("Invalid chat request: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid chat request: {}", e),
                Meta::from_raw(&body)
            );
        }
    };

    if let Err(e) = request.validate() {
        warn!("Validation failed for session '{}': {}", request.session_id, e);
        return error_response(status_for(&e), e.to_string(), request.meta(0));
    }

    match state.handler.handle(&request).await {
        Ok(reply) => {
            if let ChatReply::Envelope(envelope) = &reply {
                info!(
                    "Answered session '{}' as {:?} ({} actions, {} sources)",
                    request.session_id,
                    envelope.kind,
                    envelope.actions.len(),
                    envelope.sources.len()
                );
            }
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(e) => error_response(status_for(&e), e.to_string(), request.meta(e.retries())),
    }
}

async fn list_services_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "services": state.catalog.summaries() }))
}

async fn service_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.catalog.detail(&id) {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => {
            warn!("Service lookup failed for '{}': {}", id, e);
            // direct resource fetch, so a plain detail body rather than the chat envelope
            (status_for(&e), Json(json!({ "detail": e.to_string() }))).into_response()
        }
    }
}

async fn journey_handler(Json(req): Json<JourneyRequest>) -> impl IntoResponse {
    info!("Journey requested from '{}' to '{}' ({})", req.origin, req.destination, req.mode);
    Json(transport::plan_journey(&req.origin, &req.destination))
}

async fn transport_status_handler() -> impl IntoResponse {
    Json(transport::transport_status())
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match state.handler.health().await {
        Some(report) => Json(report).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Health check is only available in forward mode" }))).into_response(),
    }
}
