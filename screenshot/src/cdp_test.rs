use super::*;
use crate::test_support::{Reply, fake_devtools};

fn echo_script() -> crate::test_support::Script {
    Arc::new(|command: &Value| match command["method"].as_str() {
        Some("Test.silent") => Reply::Silent,
        Some("Test.close") => Reply::Close,
        Some("Test.fail") => Reply::Send(vec![json!({
            "id": command["id"],
            "error": {"code": -32000, "message": "No target with given id"}
        })]),
        Some("Test.emit") => Reply::Send(vec![
            json!({"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S1"}),
            Reply::result(command, json!({})),
        ]),
        _ => Reply::ok(command, json!({ "method": command["method"], "sessionId": command["sessionId"] })),
    })
}

async fn connect(timeout: Duration) -> CdpConnection {
    let url = fake_devtools(echo_script()).await;
    CdpConnection::connect(&url, timeout).await.unwrap()
}

// =============================================================================
// wire format
// =============================================================================

#[test]
fn parse_success_response() {
    let incoming = parse_incoming(r#"{"id":4,"result":{"targetId":"T"}}"#).unwrap();
    assert_eq!(incoming, Incoming::Response { id: 4, result: Ok(json!({"targetId": "T"})) });
}

#[test]
fn parse_error_response() {
    let incoming = parse_incoming(r#"{"id":5,"error":{"code":-32601,"message":"nope"}}"#).unwrap();
    let Incoming::Response { id, result: Err(error) } = incoming else {
        panic!("expected error response");
    };
    assert_eq!(id, 5);
    assert_eq!(error.code, -32601);
}

#[test]
fn parse_event_keeps_session() {
    let incoming = parse_incoming(r#"{"method":"Page.loadEventFired","params":{},"sessionId":"abc"}"#).unwrap();
    let Incoming::Event(event) = incoming else {
        panic!("expected event");
    };
    assert_eq!(event.method, "Page.loadEventFired");
    assert_eq!(event.session_id.as_deref(), Some("abc"));
}

#[test]
fn parse_rejects_messages_without_id_or_method() {
    assert!(matches!(parse_incoming(r#"{"params":{}}"#), Err(CdpError::Malformed(_))));
    assert!(matches!(parse_incoming("not json"), Err(CdpError::Json(_))));
}

#[test]
fn encode_adds_session_only_when_given() {
    let plain: Value = serde_json::from_str(&encode_command(1, "Target.getTargets", &json!({}), None)).unwrap();
    assert_eq!(plain["id"], 1);
    assert!(plain.get("sessionId").is_none());

    let scoped: Value = serde_json::from_str(&encode_command(2, "Page.enable", &json!({}), Some("S9"))).unwrap();
    assert_eq!(scoped["sessionId"], "S9");
    assert_eq!(scoped["method"], "Page.enable");
}

// =============================================================================
// connection
// =============================================================================

#[tokio::test]
async fn call_routes_response_by_id() {
    let cdp = connect(Duration::from_secs(5)).await;
    let (a, b) = tokio::join!(
        cdp.call("Browser.getVersion", json!({}), None),
        cdp.call("Page.enable", json!({}), Some("S2")),
    );
    assert_eq!(a.unwrap()["method"], "Browser.getVersion");
    let b = b.unwrap();
    assert_eq!(b["method"], "Page.enable");
    assert_eq!(b["sessionId"], "S2");
}

#[tokio::test]
async fn protocol_error_surfaces_code_and_message() {
    let cdp = connect(Duration::from_secs(5)).await;
    let err = cdp.call("Test.fail", json!({}), None).await.unwrap_err();
    match err {
        CdpError::Protocol { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "No target with given id");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn events_reach_subscribers() {
    let cdp = connect(Duration::from_secs(5)).await;
    let mut events = cdp.subscribe();
    cdp.call("Test.emit", json!({}), None).await.unwrap();
    let event = events.recv().await.unwrap();
    assert_eq!(event.method, "Page.loadEventFired");
    assert_eq!(event.session_id.as_deref(), Some("S1"));
}

#[tokio::test]
async fn unanswered_call_times_out() {
    let cdp = connect(Duration::from_millis(50)).await;
    let err = cdp.call("Test.silent", json!({}), None).await.unwrap_err();
    assert!(matches!(err, CdpError::Timeout { ref method } if method == "Test.silent"));
    assert!(!cdp.is_closed());
}

#[tokio::test]
async fn socket_close_fails_pending_and_later_calls() {
    let cdp = connect(Duration::from_secs(5)).await;
    let err = cdp.call("Test.close", json!({}), None).await.unwrap_err();
    assert!(matches!(err, CdpError::Closed));
    assert!(cdp.is_closed());
    assert!(matches!(cdp.call("Page.enable", json!({}), None).await, Err(CdpError::Closed)));
}

#[tokio::test]
async fn connect_failure_is_reported() {
    let result = CdpConnection::connect("ws://127.0.0.1:1/devtools", Duration::from_secs(1)).await;
    assert!(matches!(result, Err(CdpError::Connect(_))));
}
