//! Implements ChatTransport over a Node sidecar running `whatsapp-web.js`.
//!
//! The runner is spawned once per process and spoken to over stdin/stdout
//! with line-delimited JSON. Replies are parked in a pending map keyed by
//! request id; callers poll with a deadline. Lifecycle events are forwarded
//! to whatever event sink the session registered last.

use crate::adapters::whatsapp::protocol::{self, BridgeRequest, WireChat};
use crate::domain::{ChatSummary, DomainError, MediaPayload, TransportEvent};
use crate::ports::ChatTransport;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use dashmap::DashMap;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Bridge {
    child: Child,
    stdin: ChildStdin,
    reader_task: JoinHandle<()>,
    next_id: u64,
}

/// Node bridge transport. One runner child per transport instance.
pub struct NodeBridgeTransport {
    node_bin: String,
    runner: PathBuf,
    client_id: String,
    session_dir: PathBuf,
    request_timeout: Duration,
    bridge: Mutex<Option<Bridge>>,
    responses: Arc<DashMap<u64, Value>>,
    /// Current event sink. Replaced on every start() so a re-initialized
    /// session receives events on its live channel.
    events: Arc<Mutex<Option<mpsc::Sender<TransportEvent>>>>,
}

impl NodeBridgeTransport {
    pub fn new(
        node_bin: String,
        runner: PathBuf,
        client_id: String,
        session_dir: PathBuf,
        request_timeout: Duration,
    ) -> Self {
        Self {
            node_bin,
            runner,
            client_id,
            session_dir,
            request_timeout,
            bridge: Mutex::new(None),
            responses: Arc::new(DashMap::new()),
            events: Arc::new(Mutex::new(None)),
        }
    }

    async fn spawn_if_needed(&self) -> Result<(), DomainError> {
        let mut guard = self.bridge.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        if !self.runner.exists() {
            return Err(DomainError::Bridge(format!(
                "bridge runner not found at {}",
                self.runner.display()
            )));
        }

        let mut cmd = Command::new(&self.node_bin);
        cmd.arg(&self.runner)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .env("WA_BRIDGE_AUTH_DIR", &self.session_dir)
            .env("WA_BRIDGE_CLIENT_ID", &self.client_id);

        let mut child = cmd
            .spawn()
            .map_err(|e| DomainError::Bridge(format!("spawn bridge runner: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DomainError::Bridge("failed to acquire runner stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DomainError::Bridge("failed to acquire runner stdout".into()))?;

        let responses = Arc::clone(&self.responses);
        let events = Arc::clone(&self.events);
        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                let Ok(value) = serde_json::from_str::<Value>(&line) else {
                    debug!(%line, "discarding unparseable runner output");
                    continue;
                };
                if let Some(id) = value.get("id").and_then(Value::as_u64) {
                    responses.insert(id, value);
                    continue;
                }
                if let Some(event) = protocol::event_from_value(&value) {
                    let sink = events.lock().await.clone();
                    if let Some(tx) = sink {
                        let _ = tx.send(event).await;
                    }
                }
            }
        });

        info!(runner = %self.runner.display(), "bridge runner started");
        *guard = Some(Bridge {
            child,
            stdin,
            reader_task,
            next_id: 1,
        });
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, DomainError> {
        let request_id = {
            let mut guard = self.bridge.lock().await;
            let bridge = guard
                .as_mut()
                .ok_or_else(|| DomainError::Bridge("bridge runner is not running".into()))?;
            let request_id = bridge.next_id;
            bridge.next_id = bridge.next_id.saturating_add(1);

            let line = serde_json::to_string(&BridgeRequest {
                id: request_id,
                method,
                params,
            })
            .map_err(|e| DomainError::Bridge(e.to_string()))?;
            bridge
                .stdin
                .write_all(line.as_bytes())
                .await
                .map_err(|e| DomainError::Bridge(format!("write to runner: {e}")))?;
            bridge
                .stdin
                .write_all(b"\n")
                .await
                .map_err(|e| DomainError::Bridge(format!("write to runner: {e}")))?;
            bridge
                .stdin
                .flush()
                .await
                .map_err(|e| DomainError::Bridge(format!("flush runner stdin: {e}")))?;
            request_id
        };

        let deadline = tokio::time::Instant::now() + self.request_timeout;
        loop {
            if let Some((_, response)) = self.responses.remove(&request_id) {
                if let Some(error) = response.get("error") {
                    let message = error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("bridge request failed");
                    return Err(DomainError::Transport(message.to_string()));
                }
                return Ok(response.get("result").cloned().unwrap_or(Value::Null));
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DomainError::Transport(format!(
                    "bridge request timed out: {method}"
                )));
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[async_trait]
impl ChatTransport for NodeBridgeTransport {
    async fn start(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), DomainError> {
        *self.events.lock().await = Some(events);
        self.spawn_if_needed().await?;

        // The runner replies as soon as client initialization has been
        // triggered; readiness arrives later as an event.
        self.request(
            "init",
            json!({
                "clientId": self.client_id,
                "dataPath": self.session_dir,
            }),
        )
        .await?;
        Ok(())
    }

    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, DomainError> {
        let result = self.request("getChats", json!({})).await?;
        let chats: Vec<WireChat> = serde_json::from_value(result)
            .map_err(|e| DomainError::Transport(format!("malformed chat list: {e}")))?;
        Ok(chats.into_iter().map(Into::into).collect())
    }

    async fn send_text(&self, target: &str, text: &str) -> Result<(), DomainError> {
        self.request("send", json!({ "to": target, "message": text }))
            .await?;
        Ok(())
    }

    async fn send_media(
        &self,
        target: &str,
        media: &MediaPayload,
        caption: Option<&str>,
    ) -> Result<(), DomainError> {
        self.request(
            "sendMedia",
            json!({
                "to": target,
                "media": {
                    "mimetype": media.mimetype,
                    "data": BASE64.encode(&media.data),
                    "filename": media.filename,
                },
                "caption": caption,
            }),
        )
        .await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), DomainError> {
        let running = self.bridge.lock().await.is_some();
        if running {
            // Best effort: let the client close the browser cleanly before
            // the child is killed.
            if let Err(e) = self.request("destroy", json!({})).await {
                warn!(error = %e, "bridge destroy request failed");
            }
        }

        let mut guard = self.bridge.lock().await;
        if let Some(mut bridge) = guard.take() {
            let _ = bridge.child.kill().await;
            bridge.reader_task.abort();
        }
        *self.events.lock().await = None;
        Ok(())
    }
}
