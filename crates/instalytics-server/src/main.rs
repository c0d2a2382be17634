mod handlers;

use anyhow::Context;
use clap::Parser;
use instalytics::{Scraper, ScraperConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "instalytics-server", about = "Instagram analytics over HTTP", version)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:5000", env = "INSTALYTICS_LISTEN")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("instalytics=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ScraperConfig::from_env();
    // One session for the whole process, shared read-only by every request.
    let scraper = match Scraper::connect(config.clone()).await {
        Ok(scraper) => scraper,
        Err(err) => {
            tracing::warn!(
                target: "instalytics",
                "Login failed, serving public profiles only: {err}"
            );
            Scraper::resume(config)?
        }
    };
    tracing::info!(
        target: "instalytics",
        authenticated = scraper.is_authenticated(),
        "Scraper ready"
    );

    let app = handlers::router(Arc::new(scraper));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    tracing::info!(target: "instalytics", addr = %args.listen, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "instalytics", "Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "instalytics", "Shutting down");
}
