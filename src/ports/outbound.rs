//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ChatSummary, DomainError, MediaPayload, TransportEvent};
use tokio::sync::mpsc;

/// Boundary to the external WhatsApp Web client. Everything protocol-side
/// (authentication handshake, chat retrieval, message transport) lives
/// behind this trait; the application only sees lifecycle events and the
/// five operations below.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Boot the external client. Lifecycle events (QR, ready, auth failure,
    /// disconnect) are delivered on `events` until shutdown. Calling start
    /// on an already-running transport re-issues client initialization and
    /// must not spawn a second client.
    async fn start(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), DomainError>;

    /// Fetch every chat visible to the authenticated session.
    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, DomainError>;

    /// Send a plain text message to the chat identified by `target`.
    async fn send_text(&self, target: &str, text: &str) -> Result<(), DomainError>;

    /// Send a media payload with an optional caption.
    async fn send_media(
        &self,
        target: &str,
        media: &MediaPayload,
        caption: Option<&str>,
    ) -> Result<(), DomainError>;

    /// Release the external client (child process, open handles). Safe to
    /// call repeatedly.
    async fn shutdown(&self) -> Result<(), DomainError>;
}
