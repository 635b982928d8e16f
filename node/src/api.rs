//! HTTP control surface for a FLIPNET participant

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use flipnet_transport::PeerMessage;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::runtime::Participant;

/// API state: the participant behind the surface
pub type ApiState = Arc<Participant>;

/// Create API router
pub fn create_router(participant: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health))
        .route("/status", get(status))
        // Consensus lifecycle
        .route("/start", get(start))
        .route("/stop", get(stop))
        .route("/getState", get(get_state))
        // Peer traffic
        .route("/message", post(message))
        .with_state(participant)
        .layer(cors)
}

/// Health check
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Liveness vs fault status
async fn status(State(participant): State<ApiState>) -> impl IntoResponse {
    if participant.is_faulty() {
        (StatusCode::INTERNAL_SERVER_ERROR, Json("faulty"))
    } else {
        (StatusCode::OK, Json("live"))
    }
}

/// Current state snapshot; succeeds even after a stop
async fn get_state(State(participant): State<ApiState>) -> impl IntoResponse {
    Json(participant.snapshot())
}

/// Launch the consensus driver; non-blocking
async fn start(State(participant): State<ApiState>) -> impl IntoResponse {
    match participant.start() {
        Ok(()) => (StatusCode::OK, Json(json!({"success": true}))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        ),
    }
}

/// Permanently stop the participant; always succeeds
async fn stop(State(participant): State<ApiState>) -> impl IntoResponse {
    participant.stop();
    Json(json!({"success": true}))
}

/// Inbound peer message delivery
async fn message(
    State(participant): State<ApiState>,
    Json(peer_message): Json<PeerMessage>,
) -> impl IntoResponse {
    match participant.deliver(peer_message) {
        Ok(()) => (StatusCode::OK, Json(json!({"success": true}))),
        Err(e) => {
            warn!(
                "rejected message from node {}: {}",
                peer_message.from, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}
