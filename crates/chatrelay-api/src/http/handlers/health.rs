//! Liveness probes.

use axum::Json;
use axum::extract::{ConnectInfo, State};
use serde_json::{Value, json};
use std::net::SocketAddr;

use crate::http::error::AppError;
use crate::state::AppState;

/// Report process liveness. Optionally restricted to loopback callers
/// so the probe is not a public fingerprinting surface.
pub async fn health(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Value>, AppError> {
    if state.settings.health_local_only && !addr.ip().is_loopback() {
        return Err(AppError::Forbidden("health probe is local-only".to_string()));
    }
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
