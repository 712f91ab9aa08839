//! One-shot entrypoint: send the weekly "Meta da Rede" report to the
//! configured group, then tear the session down.

use chrono::Local;
use std::sync::Arc;
use tracing::{error, info};
use wa_report::domain::DomainError;
use wa_report::shared::{bootstrap, config::AppConfig, logging};
use wa_report::usecases::{Dispatcher, ReportComposer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().unwrap_or_default();
    let _log_guard = logging::init(&cfg.log_dir())?;

    if let Err(e) = run(&cfg).await {
        error!(error = %e, "failed to send the weekly report");
    }
    Ok(())
}

async fn run(cfg: &AppConfig) -> Result<(), DomainError> {
    cfg.validate()?;
    let session = bootstrap::session_from_config(cfg);
    let composer = ReportComposer::new(
        Dispatcher::new(Arc::clone(&session)),
        cfg.group_id_or_default(),
        cfg.reports_dir(),
    );

    let request = composer.weekly_request(Local::now().date_naive());
    info!(file = %request.file.display(), "weekly report composed");

    session.initialize().await?;
    let outcome = composer.send(&request).await;

    // Give the upload time to complete before tearing the client down.
    tokio::time::sleep(cfg.post_send_delay()).await;
    session.destroy().await?;

    if outcome.delivered {
        info!("weekly report sent");
    }
    Ok(())
}
