//! Error taxonomy for the gateway.
//!
//! Three caller-distinguishable failure classes cross the dispatch
//! boundary; payload shape mismatches are deliberately NOT errors -- the
//! extraction layer resolves them to sentinel answer strings instead.

use thiserror::Error;

/// Errors produced by dispatching a chat turn to the upstream provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing credentials or invalid per-request configuration.
    /// 400-class; never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Non-2xx answer from the upstream provider. The HTTP boundary
    /// forwards the upstream status and body for debuggability.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Network or timeout failure reaching the provider. 502-class.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

/// Errors from history persistence operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}
