//! Wire protocol for the Node bridge runner. Line-delimited JSON.
//!
//! Requests carry an `id` and are answered with `{id, result}` or
//! `{id, error: {message}}`. Unsolicited lifecycle events carry an `event`
//! name and a `payload` object.

use crate::domain::{ChatSummary, TransportEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct BridgeRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

/// Chat record as the runner reports it (`whatsapp-web.js` field names).
#[derive(Debug, Deserialize)]
pub struct WireChat {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "isGroup", default)]
    pub is_group: bool,
}

impl From<WireChat> for ChatSummary {
    fn from(chat: WireChat) -> Self {
        Self {
            id: chat.id,
            name: chat.name,
            is_group: chat.is_group,
        }
    }
}

/// Map an unsolicited runner line to a transport event. Returns `None` for
/// lines that are not events (or event names this client does not know).
pub fn event_from_value(value: &Value) -> Option<TransportEvent> {
    let event = value.get("event")?.as_str()?;
    let payload = value.get("payload").cloned().unwrap_or(Value::Null);
    match event {
        "qr" => payload
            .get("qr")
            .and_then(Value::as_str)
            .map(|qr| TransportEvent::Qr(qr.to_string())),
        "ready" => Some(TransportEvent::Ready),
        "auth_failure" => Some(TransportEvent::AuthFailure(
            payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("authentication rejected")
                .to_string(),
        )),
        "disconnected" => Some(TransportEvent::Disconnected(
            payload
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        )),
        "loading_screen" => Some(TransportEvent::LoadingScreen {
            percent: payload.get("percent").and_then(Value::as_u64).unwrap_or(0) as u32,
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => None,
    }
}
