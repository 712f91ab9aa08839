//! Session lifecycle: one external client per process, owned here.
//!
//! Translates the transport's asynchronous lifecycle events into a single
//! awaitable "ready" contract. Initialize is idempotent and serialized;
//! destroy is terminal.

use crate::adapters::ui::qr;
use crate::domain::{DomainError, SessionState, TransportEvent};
use crate::ports::ChatTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Capacity for the transport event channel. Lifecycle events are rare;
/// a small buffer keeps the bridge reader from ever blocking on the pump.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// The one session a process owns. Other components borrow it for the
/// duration of a single operation; it is the sole owner of the transport.
pub struct Session {
    transport: Arc<dyn ChatTransport>,
    state_tx: watch::Sender<SessionState>,
    ready_timeout: Duration,
    /// Guards the whole initialize/destroy critical section and owns the
    /// event pump task. Held across the ready wait so a concurrent
    /// initialize blocks and then observes `Ready` instead of starting the
    /// client a second time.
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new(transport: Arc<dyn ChatTransport>, ready_timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Uninitialized);
        Self {
            transport,
            state_tx,
            ready_timeout,
            pump: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Fails unless the session has reached ready. Destroyed and failed
    /// sessions report their terminal error instead of `NotReady`.
    pub fn require_ready(&self) -> Result<(), DomainError> {
        match self.state() {
            SessionState::Ready => Ok(()),
            SessionState::Destroyed => Err(DomainError::Destroyed),
            SessionState::Failed(reason) => Err(DomainError::Auth(reason)),
            _ => Err(DomainError::NotReady),
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Boot the external client and suspend until it signals readiness.
    ///
    /// Idempotent: a call on a ready session is a no-op, and two concurrent
    /// calls result in exactly one underlying client initialization. A
    /// session that disconnected can be re-initialized with a fresh call.
    /// The wait is bounded by the configured ready timeout.
    pub async fn initialize(&self) -> Result<(), DomainError> {
        let mut pump = self.pump.lock().await;
        match self.state() {
            SessionState::Ready => return Ok(()),
            SessionState::Destroyed => return Err(DomainError::Destroyed),
            SessionState::Failed(reason) => return Err(DomainError::Auth(reason)),
            SessionState::Uninitialized
            | SessionState::AwaitingAuth
            | SessionState::Disconnected => {}
        }

        // Replace any previous pump so events from a restarted client land
        // on the live channel.
        if let Some(old) = pump.take() {
            old.abort();
        }
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        *pump = Some(self.spawn_pump(events_rx));

        self.transport.start(events_tx).await?;
        self.await_ready().await
    }

    /// Release everything the external client holds. Always safe to call;
    /// afterwards every operation fails with [`DomainError::Destroyed`].
    pub async fn destroy(&self) -> Result<(), DomainError> {
        let mut pump = self.pump.lock().await;
        if self.state() == SessionState::Destroyed {
            return Ok(());
        }

        let shutdown = self.transport.shutdown().await;
        if let Some(handle) = pump.take() {
            handle.abort();
        }
        self.state_tx.send_replace(SessionState::Destroyed);

        if let Err(e) = shutdown {
            warn!(error = %e, "transport shutdown reported an error");
        }
        info!("WhatsApp session finalized");
        Ok(())
    }

    async fn await_ready(&self) -> Result<(), DomainError> {
        let mut rx = self.state_tx.subscribe();
        let wait = async {
            loop {
                match rx.borrow_and_update().clone() {
                    SessionState::Ready => return Ok(()),
                    SessionState::Failed(reason) => return Err(DomainError::Auth(reason)),
                    SessionState::Destroyed => return Err(DomainError::Destroyed),
                    _ => {}
                }
                if rx.changed().await.is_err() {
                    return Err(DomainError::Transport("session state channel closed".into()));
                }
            }
        };
        match tokio::time::timeout(self.ready_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Timeout(self.ready_timeout)),
        }
    }

    fn spawn_pump(&self, mut events: mpsc::Receiver<TransportEvent>) -> JoinHandle<()> {
        let state = self.state_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::Qr(payload) => {
                        state.send_replace(SessionState::AwaitingAuth);
                        match qr::render_unicode(&payload) {
                            Ok(block) => {
                                info!("scan the QR code below with WhatsApp on your phone:\n{block}");
                            }
                            Err(e) => error!(error = %e, "failed to render the pairing QR"),
                        }
                    }
                    TransportEvent::LoadingScreen { percent, message } => {
                        info!(percent, %message, "loading screen");
                    }
                    TransportEvent::Ready => {
                        info!("WhatsApp is ready");
                        state.send_replace(SessionState::Ready);
                    }
                    TransportEvent::AuthFailure(reason) => {
                        error!(%reason, "authentication failed");
                        state.send_replace(SessionState::Failed(reason));
                    }
                    TransportEvent::Disconnected(reason) => {
                        // No auto-reconnect; a fresh initialize() is required.
                        warn!(%reason, "disconnected");
                        state.send_replace(SessionState::Disconnected);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::whatsapp::MockTransport;

    fn session_with(transport: &Arc<MockTransport>, timeout: Duration) -> Session {
        let dyn_transport: Arc<dyn ChatTransport> = transport.clone();
        Session::new(dyn_transport, timeout)
    }

    #[tokio::test]
    async fn initialize_reaches_ready() {
        let transport = Arc::new(MockTransport::ready());
        let session = session_with(&transport, Duration::from_secs(1));

        session.initialize().await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(transport.start_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_initialize_starts_the_client_once() {
        let transport = Arc::new(MockTransport::ready());
        let session = Arc::new(session_with(&transport, Duration::from_secs(1)));

        let (a, b) = tokio::join!(session.initialize(), session.initialize());
        a.unwrap();
        b.unwrap();

        assert_eq!(transport.start_count(), 1);
    }

    #[tokio::test]
    async fn initialize_after_ready_is_a_noop() {
        let transport = Arc::new(MockTransport::ready());
        let session = session_with(&transport, Duration::from_secs(1));

        session.initialize().await.unwrap();
        session.initialize().await.unwrap();

        assert_eq!(transport.start_count(), 1);
    }

    #[tokio::test]
    async fn initialize_times_out_when_the_client_stays_silent() {
        let transport = Arc::new(MockTransport::silent());
        let session = session_with(&transport, Duration::from_millis(50));

        let err = session.initialize().await.unwrap_err();
        assert!(matches!(err, DomainError::Timeout(_)));
    }

    #[tokio::test]
    async fn auth_failure_rejects_initialize_and_parks_the_session() {
        let transport = Arc::new(MockTransport::auth_failure());
        let session = session_with(&transport, Duration::from_secs(1));

        let err = session.initialize().await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(_)));
        assert!(matches!(session.state(), SessionState::Failed(_)));

        // The failed state is terminal for this session.
        let err = session.initialize().await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(_)));
        assert_eq!(transport.start_count(), 1);
    }

    #[tokio::test]
    async fn destroy_is_terminal_and_repeatable() {
        let transport = Arc::new(MockTransport::ready());
        let session = session_with(&transport, Duration::from_secs(1));

        session.initialize().await.unwrap();
        session.destroy().await.unwrap();
        session.destroy().await.unwrap();

        assert_eq!(transport.shutdown_count(), 1);
        assert!(matches!(
            session.initialize().await.unwrap_err(),
            DomainError::Destroyed
        ));
        assert!(matches!(
            session.require_ready().unwrap_err(),
            DomainError::Destroyed
        ));
    }

    #[tokio::test]
    async fn require_ready_before_initialize_is_not_ready() {
        let transport = Arc::new(MockTransport::ready());
        let session = session_with(&transport, Duration::from_secs(1));

        assert!(matches!(
            session.require_ready().unwrap_err(),
            DomainError::NotReady
        ));
    }
}
