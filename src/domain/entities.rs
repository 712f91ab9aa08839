//! Domain entities. Pure data structures for the core business.
//!
//! No WhatsApp/IO types here; these are mapped from adapters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::DomainError;

/// Lifecycle state of the one session a process owns.
///
/// Transitions are driven entirely by [`TransportEvent`]s:
/// `Uninitialized → AwaitingAuth → Ready → {Disconnected | Destroyed}`.
/// `Failed` can only be entered from `AwaitingAuth` and is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// QR shown; waiting for the operator to scan.
    AwaitingAuth,
    Ready,
    Disconnected,
    /// Authentication rejected. Requires a fresh process run and re-scan.
    Failed(String),
    Destroyed,
}

/// Raw chat as delivered by the transport. Order is not guaranteed stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub name: String,
    pub is_group: bool,
}

/// A group chat, addressable by its opaque serialized identifier
/// (e.g. `123456789-987654321@g.us`). Read-only, never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

/// One scheduled send: the composed message and the resolved report path.
/// Computed once per entrypoint invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub message: String,
    pub file: PathBuf,
}

/// Outcome of a single send attempt. The boolean contract of the original
/// dispatcher is kept, with the underlying error carried alongside so
/// callers can observe the failure kind instead of only a log line.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub delivered: bool,
    pub error: Option<DomainError>,
}

impl DispatchOutcome {
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            error: None,
        }
    }

    pub fn failed(error: DomainError) -> Self {
        Self {
            delivered: false,
            error: Some(error),
        }
    }
}

/// Transport-native media payload. The adapter encodes `data` as base64 at
/// the wire boundary.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub filename: String,
    pub mimetype: String,
    pub data: Vec<u8>,
}

/// Asynchronous lifecycle events emitted by the external client.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Pairing QR payload to render on the operator's terminal.
    Qr(String),
    LoadingScreen { percent: u32, message: String },
    Ready,
    AuthFailure(String),
    Disconnected(String),
}
