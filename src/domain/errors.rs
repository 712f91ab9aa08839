//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Authentication rejected. Terminal: requires an operator re-scan.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Operation attempted before the session reached ready.
    #[error("session not ready")]
    NotReady,

    /// Operation attempted after destroy(). Terminal.
    #[error("session destroyed")]
    Destroyed,

    /// Ready wait exceeded the configured bound.
    #[error("timed out after {0:?} waiting for session readiness")]
    Timeout(Duration),

    /// Send/fetch failed at the external client layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// Report file absent at the expected path. Checked before any send.
    #[error("report file missing: {}", .0.display())]
    MissingFile(PathBuf),

    /// Caller-side validation failure (empty target, empty message).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Bridge process / wire protocol failure.
    #[error("bridge error: {0}")]
    Bridge(String),

    #[error("config error: {0}")]
    Config(String),
}
