//! Route table and middleware stack.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{chat, health};
use crate::state::AppState;

/// Directory of static assets to serve at the root, when present.
const WEB_DIR_VAR: &str = "CHATRELAY_WEB_DIR";

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/chat", post(chat::chat))
        // Legacy alias kept for older front-end deployments.
        .route("/api/ai-chat", post(chat::chat))
        .route("/health", get(health::health))
        .route("/healthz", get(health::health));

    if let Ok(dir) = std::env::var(WEB_DIR_VAR) {
        tracing::info!(dir, "serving static assets");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
