//! Shared application state wired once at startup.

use std::sync::Arc;

use chatrelay_core::dispatch::Dispatcher;
use chatrelay_core::ratelimit::RateLimiter;
use chatrelay_core::session::SessionStore;
use chatrelay_infra::sqlite::{DatabasePool, SqliteHistoryRepository};
use chatrelay_infra::upstream::FoundationClient;
use chatrelay_types::config::Settings;

pub type ConcreteDispatcher = Dispatcher<FoundationClient>;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub dispatcher: Arc<ConcreteDispatcher>,
    pub limiter: Arc<RateLimiter>,
    /// Present only when `DATABASE_URL` is configured; the gateway runs
    /// stateless without it.
    pub history: Option<Arc<SqliteHistoryRepository>>,
}

impl AppState {
    pub async fn init(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);
        let client = FoundationClient::new(settings.clone());
        Self::with_client(settings, client).await
    }

    /// Wiring entry point that accepts a pre-built upstream client, so
    /// tests can point it at a local stub server.
    pub async fn with_client(
        settings: Arc<Settings>,
        client: FoundationClient,
    ) -> anyhow::Result<Self> {
        let dispatcher = Arc::new(Dispatcher::new(
            settings.clone(),
            client,
            SessionStore::new(),
        ));
        let limiter = Arc::new(RateLimiter::new(
            settings.rate_limit_requests,
            settings.rate_limit_window,
        ));
        let history = match settings.database_url.as_deref() {
            Some(url) => {
                let pool = DatabasePool::new(url).await?;
                tracing::info!(url, "chat history persistence enabled");
                Some(Arc::new(SqliteHistoryRepository::new(pool)))
            }
            None => {
                tracing::info!("no DATABASE_URL set, chat history persistence disabled");
                None
            }
        };
        Ok(Self {
            settings,
            dispatcher,
            limiter,
            history,
        })
    }
}
