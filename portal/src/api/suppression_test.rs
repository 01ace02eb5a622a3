use super::*;
use crate::test_support::{logged_in_client, serve};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn wait_processed_returns_final_count() {
    let polls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/api/suppression/{id}",
            get(|State(polls): State<Arc<AtomicUsize>>| async move {
                if polls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Json(serde_json::json!({"id": "s-1", "name": "bounces", "status": "processing"}))
                } else {
                    Json(serde_json::json!({"id": "s-1", "name": "bounces", "status": "complete", "count": 412}))
                }
            }),
        )
        .with_state(Arc::clone(&polls));
    let suppression = Suppression::new(logged_in_client(&serve(router).await));

    let list = suppression
        .wait_processed_with("s-1", PollPolicy::every(Duration::from_millis(10)))
        .await
        .unwrap();
    assert_eq!(list.status, JobStatus::Complete);
    assert_eq!(list.count, Some(412));
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unauthorized_poll_stops_and_logs_out() {
    let router = Router::new().route(
        "/api/suppression/{id}",
        get(|| async { axum::http::StatusCode::UNAUTHORIZED }),
    );
    let api = logged_in_client(&serve(router).await);
    let suppression = Suppression::new(api.clone());

    let err = suppression
        .wait_processed_with("s-1", PollPolicy::every(Duration::from_millis(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!api.session().is_logged_in());
}
