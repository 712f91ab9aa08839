//! One-shot entrypoint: list the groups visible to the session, with the
//! serialized ids used as send destinations.

use std::sync::Arc;
use tracing::{error, info};
use wa_report::domain::DomainError;
use wa_report::shared::{bootstrap, config::AppConfig, logging};
use wa_report::usecases::GroupDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().unwrap_or_default();
    let _log_guard = logging::init(&cfg.log_dir())?;

    if let Err(e) = run(&cfg).await {
        error!(error = %e, "failed to list groups");
    }
    Ok(())
}

async fn run(cfg: &AppConfig) -> Result<(), DomainError> {
    cfg.validate()?;
    let session = bootstrap::session_from_config(cfg);
    let directory = GroupDirectory::new(Arc::clone(&session));

    session.initialize().await?;
    let result = directory.list_groups().await;
    if let Ok(groups) = &result {
        for (idx, group) in groups.iter().enumerate() {
            info!("group {}: {} (id: {})", idx + 1, group.name, group.id);
        }
        info!(total = groups.len(), "groups listed");
    }

    // Teardown runs even when the listing failed.
    session.destroy().await?;
    result.map(|_| ())
}
