//! HTTP transport for the agent gateway.
//!
//! A single JSON-RPC endpoint at `POST /rpc`. Every response carries
//! permissive cross-origin headers so any agent host can call the gateway
//! directly, and OPTIONS pre-flight requests are answered by the CORS layer.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use devtrack_core::db::Database;

use crate::gateway::{protocol, Gateway};

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/", get(liveness))
        // Any non-POST verb gets the liveness message instead of a 405.
        .route("/rpc", post(rpc).fallback(liveness))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Gateway::new(db))
}

async fn rpc(State(gateway): State<Gateway>, body: String) -> Json<Value> {
    let response = match serde_json::from_str::<Value>(&body) {
        Ok(request) => gateway.handle(&request),
        Err(e) => protocol::error_response(
            Value::Null,
            protocol::PARSE_ERROR,
            &format!("Parse error: {e}"),
        ),
    };
    Json(response)
}

async fn liveness() -> &'static str {
    "Devtrack agent gateway is running. POST JSON-RPC to /rpc."
}
