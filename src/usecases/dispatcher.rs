//! Message dispatch: one text or file+caption send per call.
//!
//! Transport failures are caught here, logged, and returned as a failed
//! outcome carrying the error kind. They never propagate as panics or
//! crash the process.

use crate::domain::{DispatchOutcome, DomainError, MediaPayload};
use crate::usecases::Session;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub struct Dispatcher {
    session: Arc<Session>,
}

impl Dispatcher {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Send a plain text message. Fire-and-forget beyond the transport's
    /// own acknowledgment; no delivery receipts are tracked.
    pub async fn send_text(&self, target: &str, text: &str) -> DispatchOutcome {
        if target.trim().is_empty() {
            return DispatchOutcome::failed(DomainError::InvalidRequest(
                "target id must not be empty".into(),
            ));
        }
        if text.trim().is_empty() {
            return DispatchOutcome::failed(DomainError::InvalidRequest(
                "message text must not be empty".into(),
            ));
        }
        if let Err(e) = self.session.require_ready() {
            return DispatchOutcome::failed(e);
        }

        match self.session.transport().send_text(target, text).await {
            Ok(()) => {
                info!(target, "message sent");
                DispatchOutcome::delivered()
            }
            Err(e) => {
                error!(target, error = %e, "failed to send message");
                DispatchOutcome::failed(e)
            }
        }
    }

    /// Send a file with an optional caption. The file must exist and be
    /// readable; a missing file fails with `MissingFile` before any
    /// transport call is attempted.
    pub async fn send_file(
        &self,
        target: &str,
        path: &Path,
        caption: Option<&str>,
    ) -> DispatchOutcome {
        if target.trim().is_empty() {
            return DispatchOutcome::failed(DomainError::InvalidRequest(
                "target id must not be empty".into(),
            ));
        }
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return DispatchOutcome::failed(DomainError::MissingFile(path.to_path_buf())),
        }
        if let Err(e) = self.session.require_ready() {
            return DispatchOutcome::failed(e);
        }

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(_) => return DispatchOutcome::failed(DomainError::MissingFile(path.to_path_buf())),
        };
        let media = MediaPayload {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".into()),
            mimetype: mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            data,
        };

        match self
            .session
            .transport()
            .send_media(target, &media, caption)
            .await
        {
            Ok(()) => {
                info!(target, file = %path.display(), "file sent");
                DispatchOutcome::delivered()
            }
            Err(e) => {
                error!(target, file = %path.display(), error = %e, "failed to send file");
                DispatchOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::whatsapp::MockTransport;
    use crate::ports::ChatTransport;
    use std::io::Write;
    use std::time::Duration;

    const GROUP: &str = "558589578930-1501162626@g.us";

    fn dispatcher_with(transport: &Arc<MockTransport>) -> (Arc<Session>, Dispatcher) {
        let dyn_transport: Arc<dyn ChatTransport> = transport.clone();
        let session = Arc::new(Session::new(dyn_transport, Duration::from_secs(1)));
        let dispatcher = Dispatcher::new(Arc::clone(&session));
        (session, dispatcher)
    }

    #[tokio::test]
    async fn send_text_delivers_and_records_the_message() {
        let transport = Arc::new(MockTransport::ready());
        let (session, dispatcher) = dispatcher_with(&transport);
        session.initialize().await.unwrap();

        let outcome = dispatcher.send_text(GROUP, "hello").await;

        assert!(outcome.delivered);
        assert_eq!(transport.sent_texts(), vec![(GROUP.into(), "hello".into())]);
    }

    #[tokio::test]
    async fn send_text_rejects_empty_input() {
        let transport = Arc::new(MockTransport::ready());
        let (_session, dispatcher) = dispatcher_with(&transport);

        let outcome = dispatcher.send_text("", "hello").await;
        assert!(!outcome.delivered);
        assert!(matches!(outcome.error, Some(DomainError::InvalidRequest(_))));

        let outcome = dispatcher.send_text(GROUP, "   ").await;
        assert!(!outcome.delivered);
        assert!(matches!(outcome.error, Some(DomainError::InvalidRequest(_))));
        assert_eq!(transport.text_count(), 0);
    }

    #[tokio::test]
    async fn send_text_converts_transport_errors_to_failed_outcomes() {
        let transport = Arc::new(MockTransport::ready().with_failing_sends());
        let (session, dispatcher) = dispatcher_with(&transport);
        session.initialize().await.unwrap();

        let outcome = dispatcher.send_text(GROUP, "hello").await;

        assert!(!outcome.delivered);
        assert!(matches!(outcome.error, Some(DomainError::Transport(_))));
    }

    #[tokio::test]
    async fn send_file_fails_with_missing_file_before_any_transport_call() {
        let transport = Arc::new(MockTransport::ready());
        let (session, dispatcher) = dispatcher_with(&transport);
        session.initialize().await.unwrap();

        let outcome = dispatcher
            .send_file(GROUP, Path::new("/nonexistent/RelatorioMetaRede-01-25.pdf"), None)
            .await;

        assert!(!outcome.delivered);
        assert!(matches!(outcome.error, Some(DomainError::MissingFile(_))));
        assert_eq!(transport.media_count(), 0);
    }

    #[tokio::test]
    async fn send_file_loads_the_payload_with_a_guessed_mime_type() {
        let transport = Arc::new(MockTransport::ready());
        let (session, dispatcher) = dispatcher_with(&transport);
        session.initialize().await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("RelatorioMetaRede-03-25.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 stub").unwrap();

        let outcome = dispatcher.send_file(GROUP, &path, Some("caption")).await;

        assert!(outcome.delivered);
        let sent = transport.sent_media();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, GROUP);
        assert_eq!(sent[0].1.filename, "RelatorioMetaRede-03-25.pdf");
        assert_eq!(sent[0].1.mimetype, "application/pdf");
        assert_eq!(sent[0].2.as_deref(), Some("caption"));
    }

    #[tokio::test]
    async fn sends_fail_deterministically_after_destroy() {
        let transport = Arc::new(MockTransport::ready());
        let (session, dispatcher) = dispatcher_with(&transport);
        session.initialize().await.unwrap();
        session.destroy().await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let text_outcome = dispatcher.send_text(GROUP, "hello").await;
        assert!(matches!(text_outcome.error, Some(DomainError::Destroyed)));

        let file_outcome = dispatcher.send_file(GROUP, &path, None).await;
        assert!(matches!(file_outcome.error, Some(DomainError::Destroyed)));

        assert_eq!(transport.text_count(), 0);
        assert_eq!(transport.media_count(), 0);
    }
}
