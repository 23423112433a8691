//! chatrelay server binary.

use std::net::{IpAddr, SocketAddr};

use clap::Parser;

use chatrelay_api::cli::Cli;
use chatrelay_api::http::router::build_router;
use chatrelay_api::state::AppState;
use chatrelay_types::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    chatrelay_observe::tracing_setup::init_tracing(cli.log_filter(), cli.otel)
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))?;

    let settings = Settings::from_env();
    if settings.api_key.is_none() {
        tracing::warn!("no API key configured, chat requests will be rejected");
    }

    let state = AppState::init(settings).await?;
    let app = build_router(state);

    let host: IpAddr = cli.host.parse()?;
    let addr = SocketAddr::new(host, cli.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "chatrelay listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    chatrelay_observe::tracing_setup::shutdown_tracing();
    Ok(())
}
