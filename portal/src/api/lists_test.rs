use super::*;
use crate::api::Broadcasts;
use crate::test_support::{logged_in_client, serve};
use axum::Json;
use axum::extract::Path;
use axum::routing::get;

#[tokio::test]
async fn lists_and_broadcasts_decode_camel_case() {
    let router = axum::Router::new()
        .route(
            LISTS_PATH,
            get(|| async { Json(serde_json::json!([{"id": "7", "name": "VIP", "subscriberCount": 120}])) }),
        )
        .route(
            "/api/lists/{id}",
            get(|Path(id): Path<String>| async move { Json(serde_json::json!({"id": id, "name": "VIP"})) }),
        )
        .route(
            "/api/broadcasts/{id}",
            get(|Path(id): Path<String>| async move {
                Json(serde_json::json!({"id": id, "subject": "Hello", "status": "sent", "sentAt": "2026-01-01T00:00:00Z"}))
            }),
        );
    let base = serve(router).await;
    let api = logged_in_client(&base);

    let lists = Lists::new(api.clone()).list().await.unwrap();
    assert_eq!(lists, vec![MailingList { id: "7".into(), name: "VIP".into(), subscriber_count: 120 }]);

    let one = Lists::new(api.clone()).get("7").await.unwrap();
    assert_eq!(one.subscriber_count, 0);

    let broadcast = Broadcasts::new(api).get("b-1").await.unwrap();
    assert_eq!(broadcast.status, "sent");
    assert_eq!(broadcast.sent_at.as_deref(), Some("2026-01-01T00:00:00Z"));
}
