//! BrowserID primary trust server

use std::sync::Arc;

use anyhow::{Context, Result};
use browserid_core::ShimTable;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use browserid_server::{routes, AppState, Config, HttpWellKnownFetcher, InMemoryEmailDirectory};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "browserid_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "Loaded configuration");
    if config.disable_primary_support {
        tracing::warn!("primary support is disabled");
    }

    // Shims are read once, before serving
    let shims = match &config.shimmed_primaries {
        Some(spec) => ShimTable::parse(spec).context("loading SHIMMED_PRIMARIES")?,
        None => ShimTable::new(),
    };

    let fetcher = HttpWellKnownFetcher::new(config.well_known_timeout)?
        .with_proxy(config.http_proxy.clone());

    let port = config.port;
    let state = Arc::new(AppState::new(
        config,
        fetcher,
        Arc::new(shims),
        InMemoryEmailDirectory::new(),
    ));
    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
