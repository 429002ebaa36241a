use std::sync::Arc;

use anyhow::Context;

use stockroom_api::app::{build_app, build_services};
use stockroom_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let services = build_services(config).await.context("failed to initialize stores")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
