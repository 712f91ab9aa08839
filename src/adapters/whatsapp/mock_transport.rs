//! Mock transport for testing without a runner process.
//!
//! Scripted lifecycle behavior plus call recording, so tests can assert
//! how often the underlying client was actually touched.

use crate::domain::{ChatSummary, DomainError, MediaPayload, TransportEvent};
use crate::ports::ChatTransport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// What the mock does after `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Emit `Ready` immediately.
    Ready,
    /// Emit an authentication failure.
    AuthFailure,
    /// Emit nothing; the session's ready wait runs into its timeout.
    Silent,
}

pub struct MockTransport {
    behavior: MockBehavior,
    fail_sends: bool,
    chats: Vec<ChatSummary>,
    starts: AtomicUsize,
    fetches: AtomicUsize,
    shutdowns: AtomicUsize,
    sent_texts: Mutex<Vec<(String, String)>>,
    sent_media: Mutex<Vec<(String, MediaPayload, Option<String>)>>,
}

impl MockTransport {
    fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            fail_sends: false,
            chats: Vec::new(),
            starts: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            sent_texts: Mutex::new(Vec::new()),
            sent_media: Mutex::new(Vec::new()),
        }
    }

    pub fn ready() -> Self {
        Self::new(MockBehavior::Ready)
    }

    pub fn auth_failure() -> Self {
        Self::new(MockBehavior::AuthFailure)
    }

    pub fn silent() -> Self {
        Self::new(MockBehavior::Silent)
    }

    pub fn with_chats(mut self, chats: Vec<ChatSummary>) -> Self {
        self.chats = chats;
        self
    }

    /// Every send fails with a transport error.
    pub fn with_failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn text_count(&self) -> usize {
        self.sent_texts.lock().unwrap().len()
    }

    pub fn media_count(&self) -> usize {
        self.sent_media.lock().unwrap().len()
    }

    pub fn sent_texts(&self) -> Vec<(String, String)> {
        self.sent_texts.lock().unwrap().clone()
    }

    pub fn sent_media(&self) -> Vec<(String, MediaPayload, Option<String>)> {
        self.sent_media.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatTransport for MockTransport {
    async fn start(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), DomainError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Ready => {
                let _ = events.send(TransportEvent::Ready).await;
            }
            MockBehavior::AuthFailure => {
                let _ = events
                    .send(TransportEvent::AuthFailure("invalid credentials".into()))
                    .await;
            }
            MockBehavior::Silent => {}
        }
        Ok(())
    }

    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.chats.clone())
    }

    async fn send_text(&self, target: &str, text: &str) -> Result<(), DomainError> {
        if self.fail_sends {
            return Err(DomainError::Transport("simulated send failure".into()));
        }
        self.sent_texts
            .lock()
            .unwrap()
            .push((target.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_media(
        &self,
        target: &str,
        media: &MediaPayload,
        caption: Option<&str>,
    ) -> Result<(), DomainError> {
        if self.fail_sends {
            return Err(DomainError::Transport("simulated send failure".into()));
        }
        self.sent_media.lock().unwrap().push((
            target.to_string(),
            media.clone(),
            caption.map(ToString::to_string),
        ));
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), DomainError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
