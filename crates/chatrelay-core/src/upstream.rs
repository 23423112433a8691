//! Upstream client port and provider request builders.
//!
//! [`UpstreamClient`] is the seam between dispatch policy and the wire:
//! implementations live in `chatrelay-infra`. Uses native async fn in
//! traits (RPITIT, Rust 2024 edition).
//!
//! Request bodies are built here as loosely-typed JSON: the provider's
//! request schemas differ per mode and evolve independently of this
//! gateway, so there is no value in mirroring them as structs.

use chrono::Utc;
use serde_json::{Value, json};

use chatrelay_types::chat::{ChatRole, ChatTurnRequest};
use chatrelay_types::config::Settings;
use chatrelay_types::error::GatewayError;

/// Instructions sent with memory-mode calls so the assistant consults the
/// vector index before answering.
const MEMORY_INSTRUCTIONS: &str = "You are an assistant answering the user's questions. \
    Always run the file_search tool with the user's query first to find context \
    in the vector index, then answer grounded in what it returned. If the index \
    returns nothing, say so explicitly and answer briefly from your own knowledge. \
    Do not refuse without attempting the search.";

/// HTTP port to the hosted LLM provider.
///
/// One method per upstream endpoint/mode. All methods resolve to the raw
/// response payload (or, for streaming, the accumulated final text);
/// normalization happens in the caller.
pub trait UpstreamClient: Send + Sync {
    /// Non-streaming completion call. Returns the raw response payload.
    fn complete(
        &self,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value, GatewayError>> + Send;

    /// Streaming completion call. Consumes the SSE line stream and
    /// returns the accumulated final text.
    fn complete_stream(
        &self,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send;

    /// Assistant/agent Responses call (memory and agent modes).
    fn respond(
        &self,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value, GatewayError>> + Send;
}

/// Build the ordered message list for a turn.
///
/// System context first (configured prompt, current UTC time, optional
/// profile snapshot), then history oldest-first, then the current message.
pub fn build_messages(settings: &Settings, request: &ChatTurnRequest) -> Vec<Value> {
    let mut messages = Vec::with_capacity(request.history.len() + 4);

    if let Some(prompt) = &settings.system_prompt {
        messages.push(json!({"role": ChatRole::System.to_string(), "text": prompt}));
    }
    let now_utc = Utc::now().format("%Y-%m-%d %H:%M:%S %Z");
    messages.push(json!({
        "role": ChatRole::System.to_string(),
        "text": format!("Current date/time (UTC): {now_utc}"),
    }));
    if let Some(profile) = &request.user_profile {
        messages.push(json!({
            "role": ChatRole::System.to_string(),
            "text": format!("User profile: {profile}"),
        }));
    }
    for turn in &request.history {
        messages.push(json!({"role": turn.role.to_string(), "text": turn.content}));
    }
    messages.push(json!({"role": ChatRole::User.to_string(), "text": request.message}));

    messages
}

/// Request body for the plain completion endpoint.
pub fn completion_payload(settings: &Settings, request: &ChatTurnRequest) -> Value {
    json!({
        "modelUri": settings.model_uri(),
        "completionOptions": {
            "stream": settings.stream,
            "temperature": settings.temperature,
            "maxTokens": settings.max_tokens,
        },
        "messages": build_messages(settings, request),
    })
}

/// Request body for the memory-augmented assistant endpoint.
pub fn memory_payload(settings: &Settings, request: &ChatTurnRequest) -> Value {
    let mut payload = json!({
        "model": settings.model_uri(),
        "input": request.message,
        "temperature": settings.temperature,
        "max_output_tokens": settings.max_tokens,
        "instructions": MEMORY_INSTRUCTIONS,
        "tool_choice": "auto",
        "tools": [{"file_search": {"vector_store_ids": settings.vector_store_ids}}],
    });
    // History rides along in messages form when the client supplied it.
    if !request.history.is_empty() {
        payload["messages"] = Value::Array(build_messages(settings, request));
    }
    payload
}

/// Request body for a stateful agent invocation.
///
/// `previous_response_id` chains the conversation; configured vector
/// stores are forwarded to the agent as a file_search tool.
pub fn agent_payload(
    settings: &Settings,
    request: &ChatTurnRequest,
    previous_response_id: Option<&str>,
) -> Value {
    let mut payload = json!({
        "prompt": {"id": settings.agent_id},
        "input": request.message,
    });
    if let Some(prev) = previous_response_id {
        payload["previous_response_id"] = json!(prev);
    }
    if !settings.vector_store_ids.is_empty() {
        payload["tools"] =
            json!([{"file_search": {"vector_store_ids": settings.vector_store_ids}}]);
        payload["tool_choice"] = json!("auto");
        payload["parallel_tool_calls"] = json!(true);
    }
    payload
}
