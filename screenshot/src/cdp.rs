//! DevTools protocol client: JSON commands over a single WebSocket.
//!
//! DESIGN
//! ======
//! One reader task and one writer task own the socket halves. Callers send
//! commands through [`CdpConnection::call`], which assigns a monotonically
//! increasing id, parks a oneshot under that id, and waits for the reader to
//! route the matching response back. Messages without an id are events and
//! are fanned out on a broadcast channel; subscribers filter by method and
//! session.
//!
//! ERROR HANDLING
//! ==============
//! Every call is bounded by the connection's call timeout. When the socket
//! closes, all parked callers fail with [`CdpError::Closed`] and later calls
//! fail immediately.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum CdpError {
    #[error("devtools connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("devtools connection closed")]
    Closed,
    #[error("devtools call `{method}` timed out")]
    Timeout { method: String },
    #[error("devtools error {code}: {message}")]
    Protocol { code: i64, message: String },
    #[error("invalid devtools JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed devtools message: {0}")]
    Malformed(String),
}

/// Asynchronous notification from the browser (`Page.loadEventFired`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct CdpEvent {
    pub method: String,
    pub params: Value,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProtocolError {
    pub code: i64,
    pub message: String,
}

/// A decoded inbound message.
#[derive(Debug, PartialEq)]
pub enum Incoming {
    Response { id: u64, result: Result<Value, ProtocolError> },
    Event(CdpEvent),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<ProtocolError>,
    method: Option<String>,
    params: Option<Value>,
    session_id: Option<String>,
}

/// Decode one text frame from the browser.
///
/// # Errors
///
/// Returns [`CdpError::Json`] for invalid JSON and [`CdpError::Malformed`]
/// for messages that are neither a response nor an event.
pub fn parse_incoming(text: &str) -> Result<Incoming, CdpError> {
    let raw: RawMessage = serde_json::from_str(text)?;
    if let Some(id) = raw.id {
        let result = match raw.error {
            Some(error) => Err(error),
            None => Ok(raw.result.unwrap_or(Value::Null)),
        };
        return Ok(Incoming::Response { id, result });
    }
    let Some(method) = raw.method else {
        return Err(CdpError::Malformed(text.chars().take(120).collect()));
    };
    Ok(Incoming::Event(CdpEvent {
        method,
        params: raw.params.unwrap_or(Value::Null),
        session_id: raw.session_id,
    }))
}

/// Encode one command. `session_id` targets a flat-attached page session.
#[must_use]
pub fn encode_command(id: u64, method: &str, params: &Value, session_id: Option<&str>) -> String {
    let mut command = json!({ "id": id, "method": method, "params": params });
    if let Some(session_id) = session_id {
        command["sessionId"] = Value::String(session_id.to_owned());
    }
    command.to_string()
}

// =============================================================================
// CONNECTION
// =============================================================================

type Waiter = oneshot::Sender<Result<Value, CdpError>>;

#[derive(Default)]
struct Pending {
    waiters: HashMap<u64, Waiter>,
    closed: bool,
}

struct Shared {
    pending: Mutex<Pending>,
    events: broadcast::Sender<CdpEvent>,
}

impl Shared {
    fn route(&self, incoming: Incoming) {
        match incoming {
            Incoming::Response { id, result } => {
                let waiter = self
                    .pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .waiters
                    .remove(&id);
                let Some(waiter) = waiter else {
                    debug!(id, "response for unknown or abandoned call");
                    return;
                };
                let result = result.map_err(|e| CdpError::Protocol { code: e.code, message: e.message });
                let _ = waiter.send(result);
            }
            Incoming::Event(event) => {
                // No subscribers is fine.
                let _ = self.events.send(event);
            }
        }
    }

    fn fail_all(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.closed = true;
        let failed = pending.waiters.len();
        for (_, waiter) in pending.waiters.drain() {
            let _ = waiter.send(Err(CdpError::Closed));
        }
        if failed > 0 {
            warn!(failed, "devtools socket closed with calls in flight");
        }
    }
}

pub struct CdpConnection {
    shared: Arc<Shared>,
    outgoing: mpsc::UnboundedSender<Message>,
    next_id: AtomicU64,
    call_timeout: Duration,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl CdpConnection {
    /// Connect to a browser or page debugger WebSocket.
    ///
    /// # Errors
    ///
    /// Returns [`CdpError::Connect`] if the WebSocket handshake fails.
    pub async fn connect(ws_url: &str, call_timeout: Duration) -> Result<Self, CdpError> {
        let (stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| CdpError::Connect(Box::new(e)))?;
        let (mut sink, mut source) = stream.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared { pending: Mutex::new(Pending::default()), events });

        let writer = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    debug!(error = %e, "devtools write failed");
                    break;
                }
            }
        });

        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => match parse_incoming(text.as_str()) {
                        Ok(incoming) => reader_shared.route(incoming),
                        Err(e) => warn!(error = %e, "dropping undecodable devtools message"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "devtools read failed");
                        break;
                    }
                }
            }
            reader_shared.fail_all();
        });

        debug!(%ws_url, "devtools connected");
        Ok(Self { shared, outgoing, next_id: AtomicU64::new(0), call_timeout, reader, writer })
    }

    /// Send `method` and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns [`CdpError::Protocol`] when the browser rejects the command,
    /// [`CdpError::Timeout`] when no response arrives in time, and
    /// [`CdpError::Closed`] when the socket is gone.
    pub async fn call(&self, method: &str, params: Value, session_id: Option<&str>) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.closed {
                return Err(CdpError::Closed);
            }
            pending.waiters.insert(id, tx);
        }

        let text = encode_command(id, method, &params, session_id);
        if self.outgoing.send(Message::Text(text.into())).is_err() {
            self.forget(id);
            return Err(CdpError::Closed);
        }

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::Closed),
            Err(_) => {
                self.forget(id);
                Err(CdpError::Timeout { method: method.to_owned() })
            }
        }
    }

    /// Receive every event delivered after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CdpEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner).closed
    }

    fn forget(&self, id: u64) {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .remove(&id);
    }
}

impl Drop for CdpConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

#[cfg(test)]
#[path = "cdp_test.rs"]
mod tests;
