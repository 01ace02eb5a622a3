//! In-process fake DevTools endpoint.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// What the fake browser does with one command.
pub(crate) enum Reply {
    Send(Vec<Value>),
    Silent,
    Close,
}

impl Reply {
    pub(crate) fn result(command: &Value, result: Value) -> Value {
        json!({ "id": command["id"], "result": result })
    }

    pub(crate) fn ok(command: &Value, result: Value) -> Self {
        Self::Send(vec![Self::result(command, result)])
    }
}

pub(crate) type Script = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

/// Serve a DevTools-style WebSocket answering commands with `script`.
/// Returns the `ws://` URL.
pub(crate) async fn fake_devtools(script: Script) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake devtools");
    let addr = listener.local_addr().expect("fake devtools address");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let script = Arc::clone(&script);
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    let Message::Text(text) = message else {
                        continue;
                    };
                    let command: Value = serde_json::from_str(text.as_str()).expect("command is JSON");
                    match script(&command) {
                        Reply::Send(messages) => {
                            for message in messages {
                                if ws.send(Message::Text(message.to_string().into())).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Reply::Silent => {}
                        Reply::Close => {
                            let _ = ws.close(None).await;
                            return;
                        }
                    }
                }
            });
        }
    });
    format!("ws://{addr}/devtools/browser/fake")
}
