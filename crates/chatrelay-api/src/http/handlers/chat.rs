//! The chat endpoint: gate, validate, rate-limit, dispatch, persist.

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use chatrelay_core::history::HistoryRepository;
use chatrelay_core::ratelimit::RateKey;
use chatrelay_observe::genai_attrs::{
    GEN_AI_CONVERSATION_ID, GEN_AI_OPERATION_NAME, GEN_AI_PROVIDER_NAME, GEN_AI_REQUEST_MODEL,
    OP_CHAT, OP_INVOKE_AGENT, PROVIDER_YANDEX,
};
use chatrelay_types::chat::{ChatRole, ChatTurnRequest, ChatTurnResponse};
use std::net::SocketAddr;
use tracing::Instrument;

use crate::http::error::AppError;
use crate::state::AppState;

/// How many stored turns to replay when a request arrives with an empty
/// history but a known chat id.
const HISTORY_REPLAY_LIMIT: u32 = 50;

const AGENT_SECRET_HEADER: &str = "x-agent-secret";
const USER_ID_HEADER: &str = "x-user-id";
const USER_PROFILE_HEADER: &str = "x-user-profile";

/// Handle one chat turn. Serves both `/api/chat` and its legacy alias
/// `/api/ai-chat`.
pub async fn chat(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(mut request): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    check_agent_secret(&state, &headers)?;
    apply_header_identity(&mut request, &headers);

    request.validate().map_err(AppError::Validation)?;

    let key = match request.user_id {
        Some(id) => RateKey::User(id),
        None => RateKey::Addr(addr.ip()),
    };
    let decision = state.limiter.check(key);
    if !decision.allowed {
        return Err(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs,
        });
    }

    if request.history.is_empty() {
        if let (Some(chat_id), Some(repo)) = (request.chat_id.as_deref(), state.history.as_ref()) {
            match repo.recent_turns(chat_id, HISTORY_REPLAY_LIMIT).await {
                Ok(turns) => request.history = turns,
                Err(err) => {
                    tracing::warn!(chat_id, error = %err, "failed to replay chat history")
                }
            }
        }
    }

    let operation = if state.settings.agent_id.is_some() {
        OP_INVOKE_AGENT
    } else {
        OP_CHAT
    };
    let span = tracing::info_span!(
        "chat_turn",
        { GEN_AI_OPERATION_NAME } = operation,
        { GEN_AI_PROVIDER_NAME } = PROVIDER_YANDEX,
        { GEN_AI_REQUEST_MODEL } = %state.settings.model,
        { GEN_AI_CONVERSATION_ID } = tracing::field::Empty,
    );
    let response = state
        .dispatcher
        .dispatch(&request)
        .instrument(span.clone())
        .await?;
    span.record(GEN_AI_CONVERSATION_ID, response.chat_id.as_str());

    persist_turn(&state, &request, &response).await;

    Ok(Json(response))
}

/// When a shared secret is configured, every request must present it.
fn check_agent_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.settings.agent_secret.as_deref() else {
        return Ok(());
    };
    let presented = headers
        .get(AGENT_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented == Some(expected) {
        Ok(())
    } else {
        Err(AppError::Forbidden("invalid agent secret".to_string()))
    }
}

/// Fill identity fields from headers when the body left them unset.
/// Malformed header values are ignored, not rejected.
fn apply_header_identity(request: &mut ChatTurnRequest, headers: &HeaderMap) {
    if request.user_id.is_none() {
        request.user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok());
    }
    if request.user_profile.is_none() {
        request.user_profile = headers
            .get(USER_PROFILE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| serde_json::from_str(v).ok());
    }
}

/// Best-effort transcript write. Persistence failures are logged and
/// never surface to the caller; the answer has already been produced.
async fn persist_turn(state: &AppState, request: &ChatTurnRequest, response: &ChatTurnResponse) {
    let Some(repo) = state.history.as_ref() else {
        return;
    };
    let chat_id = response.chat_id.as_str();
    if let Err(err) = repo.ensure_chat(chat_id, request.user_id).await {
        tracing::warn!(chat_id, error = %err, "failed to upsert chat row");
        return;
    }
    if let Err(err) = repo
        .append_turn(
            chat_id,
            request.user_id,
            ChatRole::User,
            &request.message,
            request.user_profile.as_ref(),
        )
        .await
    {
        tracing::warn!(chat_id, error = %err, "failed to record user turn");
    }
    if let Err(err) = repo
        .append_turn(
            chat_id,
            request.user_id,
            ChatRole::Assistant,
            &response.answer,
            None,
        )
        .await
    {
        tracing::warn!(chat_id, error = %err, "failed to record assistant turn");
    }
}
