
use tracing_subscriber::EnvFilter;

mod routes;
mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
    .init();

    let config = config::read().await?;

    if config.slack.token.is_some() {
        tracing::info!("slack token configured");
    } else {
        tracing::info!("no slack token, only answering slash commands");
    }

    let app = routes::make_router(&config)?;

    let addr = (config.server.address, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!("starting server on http://{addr}");

    axum::serve::serve(listener, app).with_graceful_shutdown(async {
        _ = tokio::signal::ctrl_c().await;
    }).await?;

    Ok(())
}
