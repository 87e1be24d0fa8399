//! HTTP gateway (Axum) for the fact-checking pipeline.
//!
//! Every response, success or failure, is the uniform envelope with a
//! fresh request id; transport failures are structured error bodies,
//! never raw exceptions.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{embedding_handler, fact_check_handler, search_handler, stats_handler};
pub use state::HandlerState;

use factlens::IndexClient;

pub fn create_router_with_state<C>(state: HandlerState<C>) -> Router
where
    C: IndexClient + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/fact-check", post(fact_check_handler))
        .route("/api/search", post(search_handler))
        .route("/api/embedding", post(embedding_handler))
        .route("/api/index/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub vectordb: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<C>(State(state): State<HandlerState<C>>) -> Response
where
    C: IndexClient + 'static,
{
    let collection = &state.index.config().collection_name;
    let vectordb_status = match state.index.client().collection_exists(collection).await {
        Ok(_) => "ready",
        Err(_) => "error",
    };

    let is_ready = vectordb_status == "ready";
    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadyResponse {
            status: if is_ready { "ok" } else { "pending" },
            components: ComponentStatus {
                http: "ready",
                vectordb: vectordb_status,
            },
        }),
    )
        .into_response()
}
