//! Per-request dispatch policy: mode selection, agent continuation
//! chaining, and the single fallback/retry path.
//!
//! Mode priority is fixed: a configured agent id selects agent mode;
//! otherwise configured vector stores select memory mode; otherwise the
//! plain completion backend runs (streaming or not, per settings).
//!
//! This is the only component that applies retry/fallback policy and the
//! only one that produces a final failure outcome. Failure inside a mode
//! is an explicit result value, never a string to be sniffed downstream.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use chatrelay_types::chat::{ChatTurnRequest, ChatTurnResponse};
use chatrelay_types::config::Settings;
use chatrelay_types::error::GatewayError;

use crate::extract::{
    AGENT_ERROR_PREFIX, AGENT_FAILURE_ANSWER, ASSISTANT_ERROR_PREFIX, answer_text,
    completion_answer, payload_error,
};
use crate::session::SessionStore;
use crate::upstream::{UpstreamClient, agent_payload, completion_payload, memory_payload};

/// Why a memory/agent call failed. Internal to the dispatcher: the
/// fallback and retry decisions react to the variant, and only a
/// human-readable description (with the mode's marker prefix) leaks out,
/// into logs.
enum CallFailure {
    /// Transport or non-2xx failure reaching the endpoint.
    Transport(GatewayError),
    /// 2xx reply carrying an explicit error payload.
    Upstream(String),
    /// Reply parsed but produced no answer text.
    NoText,
}

impl CallFailure {
    fn describe(&self, marker: &str) -> String {
        match self {
            CallFailure::Transport(err) => format!("{marker}{err}"),
            CallFailure::Upstream(msg) => format!("{marker}{msg}"),
            CallFailure::NoText => format!("{marker}reply carried no text"),
        }
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallFailure::Transport(err) => write!(f, "{err}"),
            CallFailure::Upstream(msg) => write!(f, "{msg}"),
            CallFailure::NoText => write!(f, "reply carried no text"),
        }
    }
}

/// Routes one chat turn to the configured upstream mode and normalizes
/// the reply to a single answer string plus continuation state.
pub struct Dispatcher<C> {
    settings: Arc<Settings>,
    client: C,
    sessions: SessionStore,
}

impl<C: UpstreamClient> Dispatcher<C> {
    pub fn new(settings: Arc<Settings>, client: C, sessions: SessionStore) -> Self {
        Self {
            settings,
            client,
            sessions,
        }
    }

    /// Continuation-token store handle (agent mode state).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one inbound chat turn end to end.
    ///
    /// Checks credentials before any network call, selects the mode,
    /// issues the primary call plus at most one sequential fallback or
    /// retry, and always returns a populated `chat_id`.
    pub async fn dispatch(
        &self,
        request: &ChatTurnRequest,
    ) -> Result<ChatTurnResponse, GatewayError> {
        self.settings.require_credentials()?;

        let chat_id = request
            .chat_id
            .clone()
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let answer = if self.settings.agent_id.is_some() {
            tracing::debug!(%chat_id, mode = "agent", "dispatching chat turn");
            self.agent_answer(request, &chat_id).await?
        } else if self.settings.memory_enabled() {
            tracing::debug!(%chat_id, mode = "memory", "dispatching chat turn");
            self.memory_answer_with_fallback(request).await?
        } else {
            tracing::debug!(%chat_id, mode = "plain", "dispatching chat turn");
            self.plain_answer(request).await?
        };

        Ok(ChatTurnResponse {
            answer,
            chat_id,
            channel: request.channel.clone(),
        })
    }

    /// Stateless completion call, streaming per configuration.
    async fn plain_answer(&self, request: &ChatTurnRequest) -> Result<String, GatewayError> {
        let payload = completion_payload(&self.settings, request);
        if self.settings.stream {
            self.client.complete_stream(&payload).await
        } else {
            let reply = self.client.complete(&payload).await?;
            Ok(completion_answer(&reply))
        }
    }

    /// Memory mode with its one-shot fallback: any assistant failure
    /// (transport, error payload, or empty extraction) falls back to the
    /// plain completion backend with the same turn. The fallback itself
    /// is not retried; its errors propagate normally.
    async fn memory_answer_with_fallback(
        &self,
        request: &ChatTurnRequest,
    ) -> Result<String, GatewayError> {
        match self.memory_answer(request).await {
            Ok(answer) => Ok(answer),
            Err(failure) => {
                tracing::warn!(
                    failure = %failure.describe(ASSISTANT_ERROR_PREFIX),
                    "assistant call failed, falling back to plain completion"
                );
                self.plain_answer(request).await
            }
        }
    }

    async fn memory_answer(&self, request: &ChatTurnRequest) -> Result<String, CallFailure> {
        let payload = memory_payload(&self.settings, request);
        let reply = self
            .client
            .respond(&payload)
            .await
            .map_err(CallFailure::Transport)?;
        if let Some(message) = payload_error(&reply) {
            return Err(CallFailure::Upstream(message));
        }
        match answer_text(&reply) {
            Some(answer) if !answer.trim().is_empty() => Ok(answer),
            _ => Err(CallFailure::NoText),
        }
    }

    /// Agent-mode state machine.
    ///
    /// A stored continuation token makes the call CHAINED; success stores
    /// the returned response id. A CHAINED failure evicts the token and
    /// retries exactly once FRESH. A FRESH failure is terminal and
    /// surfaces the generic failure answer, never the raw error.
    async fn agent_answer(
        &self,
        request: &ChatTurnRequest,
        chat_id: &str,
    ) -> Result<String, GatewayError> {
        let previous = self.sessions.get(chat_id);
        let chained = previous.is_some();

        match self.agent_attempt(request, previous.as_deref()).await {
            Ok((answer, response_id)) => {
                self.remember(chat_id, response_id);
                Ok(answer)
            }
            Err(failure) if chained => {
                tracing::warn!(
                    %chat_id,
                    failure = %failure.describe(AGENT_ERROR_PREFIX),
                    "chained agent call failed, retrying fresh"
                );
                self.sessions.evict(chat_id);
                match self.agent_attempt(request, None).await {
                    Ok((answer, response_id)) => {
                        self.remember(chat_id, response_id);
                        Ok(answer)
                    }
                    Err(retry_failure) => {
                        tracing::warn!(
                            %chat_id,
                            failure = %retry_failure.describe(AGENT_ERROR_PREFIX),
                            "fresh agent retry failed, giving up"
                        );
                        Ok(AGENT_FAILURE_ANSWER.to_string())
                    }
                }
            }
            Err(failure) => {
                tracing::warn!(
                    %chat_id,
                    failure = %failure.describe(AGENT_ERROR_PREFIX),
                    "fresh agent call failed, giving up"
                );
                Ok(AGENT_FAILURE_ANSWER.to_string())
            }
        }
    }

    async fn agent_attempt(
        &self,
        request: &ChatTurnRequest,
        previous_response_id: Option<&str>,
    ) -> Result<(String, Option<String>), CallFailure> {
        let payload = agent_payload(&self.settings, request, previous_response_id);
        let reply = self
            .client
            .respond(&payload)
            .await
            .map_err(CallFailure::Transport)?;
        if let Some(message) = payload_error(&reply) {
            return Err(CallFailure::Upstream(message));
        }
        let response_id = reply
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        match answer_text(&reply) {
            Some(answer) if !answer.trim().is_empty() => Ok((answer, response_id)),
            _ => Err(CallFailure::NoText),
        }
    }

    fn remember(&self, chat_id: &str, response_id: Option<String>) {
        if let Some(id) = response_id {
            self.sessions.set(chat_id, &id);
        }
    }
}
