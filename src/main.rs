//! Placeholder HTTP boundary. Binds the configured port with no routes
//! registered yet; report sends and group listing run as one-shot binaries.

use tracing::info;
use wa_report::shared::{config::AppConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().unwrap_or_default();
    let _log_guard = logging::init(&cfg.log_dir())?;
    cfg.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    let port = cfg.http_port_or_default();
    let app = axum::Router::new();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "WhatsApp report server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
