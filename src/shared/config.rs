//! Application configuration. Destination group, paths, timeouts.

use crate::domain::DomainError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Destination used when no group is configured (the network report group).
pub const DEFAULT_GROUP_ID: &str = "558589578930-1501162626@g.us";

/// Ready wait bound in seconds. Generous because first-run pairing requires
/// a manual QR scan.
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Destination group for report sends. Read from WA_REPORT_GROUP_ID.
    #[serde(default)]
    pub group_id: Option<String>,

    /// Directory holding the pre-generated report PDFs. Read from
    /// WA_REPORT_REPORTS_DIR (default `Relatorio`).
    #[serde(default)]
    pub reports_dir: Option<String>,

    /// Session-data directory handed to the external client's auth store.
    /// Read from WA_REPORT_SESSION_DIR (default `.wwebjs_auth`).
    #[serde(default)]
    pub session_dir: Option<String>,

    /// Client id within the session store. Read from WA_REPORT_CLIENT_ID.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Log directory (console output is always on). Read from WA_REPORT_LOG_DIR.
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Port for the placeholder HTTP listener. Read from WA_REPORT_HTTP_PORT.
    #[serde(default)]
    pub http_port: Option<u16>,

    /// Node executable used to launch the bridge runner. Read from WA_REPORT_NODE_BIN.
    #[serde(default)]
    pub node_bin: Option<String>,

    /// Path to the bridge runner script. Read from WA_REPORT_RUNNER_PATH.
    #[serde(default)]
    pub runner_path: Option<String>,

    /// Bound on the initialize() ready wait. Read from WA_REPORT_READY_TIMEOUT_SECS.
    #[serde(default)]
    pub ready_timeout_secs: Option<u64>,

    /// Bound on a single bridge request. Read from WA_REPORT_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Delay after a send before teardown, letting the upload complete.
    /// Read from WA_REPORT_POST_SEND_DELAY_MS.
    #[serde(default)]
    pub post_send_delay_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("WA_REPORT").try_parsing(true));
        if let Ok(path) = std::env::var("WA_REPORT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Startup validation. Entrypoints refuse to run on a broken config
    /// instead of failing mid-send.
    pub fn validate(&self) -> Result<(), DomainError> {
        let group = self.group_id_or_default();
        if group.trim().is_empty() {
            return Err(DomainError::Config(
                "destination group id must not be empty".into(),
            ));
        }
        if !group.contains('@') {
            return Err(DomainError::Config(format!(
                "destination group id {group:?} is not a serialized chat id"
            )));
        }
        if self.ready_timeout().is_zero() {
            return Err(DomainError::Config("ready timeout must be non-zero".into()));
        }
        if self.request_timeout().is_zero() {
            return Err(DomainError::Config(
                "request timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn group_id_or_default(&self) -> String {
        self.group_id
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP_ID.to_string())
    }

    pub fn reports_dir(&self) -> PathBuf {
        PathBuf::from(self.reports_dir.as_deref().unwrap_or("Relatorio"))
    }

    pub fn session_dir(&self) -> PathBuf {
        PathBuf::from(self.session_dir.as_deref().unwrap_or(".wwebjs_auth"))
    }

    pub fn client_id_or_default(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| "botwhatsapp".to_string())
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(self.log_dir.as_deref().unwrap_or("logs"))
    }

    pub fn http_port_or_default(&self) -> u16 {
        self.http_port.unwrap_or(3000)
    }

    pub fn node_bin_or_default(&self) -> String {
        self.node_bin.clone().unwrap_or_else(|| "node".to_string())
    }

    pub fn runner_path(&self) -> PathBuf {
        PathBuf::from(self.runner_path.as_deref().unwrap_or("bridge/runner.mjs"))
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(
            self.ready_timeout_secs
                .unwrap_or(DEFAULT_READY_TIMEOUT_SECS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(30))
    }

    pub fn post_send_delay(&self) -> Duration {
        Duration::from_millis(self.post_send_delay_ms.unwrap_or(2000))
    }
}
