//! Wiring. Build the transport and session from configuration.
//!
//! No business logic here; entrypoints call this once at startup.

use crate::adapters::whatsapp::NodeBridgeTransport;
use crate::ports::ChatTransport;
use crate::shared::config::AppConfig;
use crate::usecases::Session;
use std::sync::Arc;

/// Construct the Node bridge transport and the session that owns it.
pub fn session_from_config(cfg: &AppConfig) -> Arc<Session> {
    let transport: Arc<dyn ChatTransport> = Arc::new(NodeBridgeTransport::new(
        cfg.node_bin_or_default(),
        cfg.runner_path(),
        cfg.client_id_or_default(),
        cfg.session_dir(),
        cfg.request_timeout(),
    ));
    Arc::new(Session::new(transport, cfg.ready_timeout()))
}
