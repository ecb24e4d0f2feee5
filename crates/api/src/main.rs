use anyhow::{Context, Result};
use hydro_api::{build_app, ApiConfig};
use hydro_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("hydro_api");

    let config = ApiConfig::from_env().context("invalid server configuration")?;
    let bind = config.bind_addr();
    let app = build_app(config);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(bind = %bind, "hydrology briefing api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("hydrology briefing api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
