use anyhow::Context;

use decorshop_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    decorshop_observability::init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let app = decorshop_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
