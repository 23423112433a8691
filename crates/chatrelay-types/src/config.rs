//! Gateway settings pulled from environment variables.
//!
//! All knobs have defaults matching a local development setup except the
//! two upstream credentials, which stay `None` until configured. The API
//! key is wrapped in [`SecretString`] and is never logged or printed.

use secrecy::SecretString;

use std::time::Duration;

use crate::error::GatewayError;

/// Default completion endpoint (Yandex Foundation Models).
pub const DEFAULT_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// Default assistant/agent Responses endpoint (Yandex AI Studio).
pub const DEFAULT_ASSISTANT_URL: &str =
    "https://rest-assistant.api.cloud.yandex.net/v1/responses";

/// Application configuration, one instance per process.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Upstream API key (`YANDEX_API_KEY`). Mandatory for dispatch.
    pub api_key: Option<SecretString>,
    /// Upstream tenant/folder id (`YANDEX_FOLDER_ID`). Mandatory for dispatch.
    pub folder_id: Option<String>,
    /// Model short name (`YANDEX_MODEL`).
    pub model: String,
    /// Full model URI override (`YANDEX_MODEL_URI`).
    pub model_uri: Option<String>,
    /// System prompt prepended to every conversation (`YANDEX_SYSTEM_PROMPT`).
    pub system_prompt: Option<String>,
    /// Use the streaming completion path (`YANDEX_STREAM`).
    pub stream: bool,
    /// Sampling temperature (`YANDEX_TEMPERATURE`).
    pub temperature: f64,
    /// Output token cap (`YANDEX_MAX_TOKENS`).
    pub max_tokens: u32,
    /// Upstream HTTP timeout (`REQUEST_TIMEOUT`, seconds).
    pub request_timeout: Duration,
    /// Shared-secret header value (`AI_AGENT_SECRET`); gate disabled when unset.
    pub agent_secret: Option<String>,
    /// Rate limit: admissions per window (`RATE_LIMIT_REQUESTS_PER_MINUTE`).
    pub rate_limit_requests: u32,
    /// Rate limit: window length (`RATE_LIMIT_WINDOW_SEC`, seconds).
    pub rate_limit_window: Duration,
    /// History database URL (`DATABASE_URL`); persistence disabled when unset.
    pub database_url: Option<String>,
    /// Plain completion endpoint (`YANDEX_COMPLETION_URL`).
    pub completion_url: String,
    /// Assistant/agent Responses endpoint (`YANDEX_ASSISTANT_URL`).
    pub assistant_url: String,
    /// Fixed AI Studio agent id (`YANDEX_AGENT_ID`); selects agent mode.
    pub agent_id: Option<String>,
    /// Vector store ids for file_search (`YANDEX_VECTOR_STORE_IDS`,
    /// comma-separated); selects memory mode when agent mode is off.
    pub vector_store_ids: Vec<String>,
    /// Restrict /health and /healthz to loopback callers (`HEALTH_LOCAL_ONLY`).
    pub health_local_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            folder_id: None,
            model: "yandexgpt-lite".to_string(),
            model_uri: None,
            system_prompt: None,
            stream: true,
            temperature: 0.3,
            max_tokens: 800,
            request_timeout: Duration::from_secs_f64(30.0),
            agent_secret: None,
            rate_limit_requests: 120,
            rate_limit_window: Duration::from_secs_f64(60.0),
            database_url: None,
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            assistant_url: DEFAULT_ASSISTANT_URL.to_string(),
            agent_id: None,
            vector_store_ids: Vec::new(),
            health_local_only: false,
        }
    }
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to the defaults rather than failing
    /// startup; a malformed knob is logged by the caller-visible value it
    /// produces, not by aborting the process.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Settings {
            api_key: non_empty("YANDEX_API_KEY").map(SecretString::from),
            folder_id: non_empty("YANDEX_FOLDER_ID"),
            model: non_empty("YANDEX_MODEL").unwrap_or(defaults.model),
            model_uri: non_empty("YANDEX_MODEL_URI"),
            system_prompt: non_empty("YANDEX_SYSTEM_PROMPT"),
            stream: non_empty("YANDEX_STREAM")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.stream),
            temperature: non_empty("YANDEX_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: non_empty("YANDEX_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            request_timeout: non_empty("REQUEST_TIMEOUT")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|secs| *secs > 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(defaults.request_timeout),
            agent_secret: non_empty("AI_AGENT_SECRET"),
            rate_limit_requests: non_empty("RATE_LIMIT_REQUESTS_PER_MINUTE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_window: non_empty("RATE_LIMIT_WINDOW_SEC")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|secs| *secs > 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(defaults.rate_limit_window),
            database_url: non_empty("DATABASE_URL"),
            completion_url: non_empty("YANDEX_COMPLETION_URL").unwrap_or(defaults.completion_url),
            assistant_url: non_empty("YANDEX_ASSISTANT_URL").unwrap_or(defaults.assistant_url),
            agent_id: non_empty("YANDEX_AGENT_ID"),
            vector_store_ids: non_empty("YANDEX_VECTOR_STORE_IDS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            health_local_only: non_empty("HEALTH_LOCAL_ONLY")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.health_local_only),
        }
    }

    /// Effective model URI: explicit override, else `gpt://{folder}/{model}`.
    pub fn model_uri(&self) -> String {
        if let Some(uri) = &self.model_uri {
            return uri.clone();
        }
        let folder = self.folder_id.as_deref().unwrap_or("missing-folder");
        format!("gpt://{folder}/{}", self.model)
    }

    /// Memory mode is selected when at least one vector store is configured.
    pub fn memory_enabled(&self) -> bool {
        !self.vector_store_ids.is_empty()
    }

    /// Both mandatory upstream credentials must be present before any
    /// network call is attempted.
    pub fn require_credentials(&self) -> Result<(), GatewayError> {
        if self.api_key.is_none() || self.folder_id.is_none() {
            return Err(GatewayError::Config(
                "upstream credentials are not configured".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
