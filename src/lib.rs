use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod allowlist;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod services;
pub mod slug;
pub mod store;

#[cfg(test)]
pub mod testing;

use identity::IdentityProvider;
use store::SubmissionStore;

/// Shared collaborator handles for the request handlers
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn SubmissionStore>,
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/submission",
            get(handlers::submission::get)
                .post(handlers::submission::save)
                .put(handlers::submission::save)
                .delete(handlers::submission::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_owner,
        ));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/callback", get(handlers::login::callback))
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Stall API",
            "version": version,
            "description": "Stallholder submission backend for the marketplace site",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login_callback": "/auth/callback (public - session exchange)",
                "submission": "/api/submission (protected - GET/POST/PUT/DELETE)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
