//! One-shot entrypoint: send the bonus report. With four positional args
//! `[startLabel, endLabel, refMonth, refYear]` it sends the annual report
//! for that period; with fewer it falls back to the current month.

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

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&cfg, &args).await {
        error!(error = %e, "failed to send the bonus report");
    }
    Ok(())
}

async fn run(cfg: &AppConfig, args: &[String]) -> Result<(), DomainError> {
    cfg.validate()?;
    let session = bootstrap::session_from_config(cfg);
    let composer = ReportComposer::new(
        Dispatcher::new(Arc::clone(&session)),
        cfg.group_id_or_default(),
        cfg.reports_dir(),
    );

    let request = composer.bonus_request(args, Local::now().date_naive())?;
    info!(file = %request.file.display(), "bonus report composed");

    session.initialize().await?;
    let outcome = composer.send(&request).await;

    // Give the upload time to complete before tearing the client down.
    tokio::time::sleep(cfg.post_send_delay()).await;
    session.destroy().await?;

    if outcome.delivered {
        info!("bonus report sent");
    }
    Ok(())
}
