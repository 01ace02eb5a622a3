use super::*;
use crate::browser::{RenderError, Renderer};
use axum::body::{Body, to_bytes};
use axum::http::Request;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct MockRenderer {
    seen: Mutex<Vec<RenderRequest>>,
    fail: bool,
}

#[async_trait::async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(RenderError::LoadTimeout(std::time::Duration::from_secs(30)));
        }
        Ok(b"\x89PNG\r\n".to_vec())
    }
}

fn state(renderer: Arc<MockRenderer>) -> AppState {
    AppState::new(renderer)
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn capture_returns_png() {
    let renderer = Arc::new(MockRenderer::default());
    let body = CaptureRequest { url: Some("https://example.test".into()), mobile: Some(true), width: Some(414.0) };
    let response = capture(State(state(renderer.clone())), Ok(Json(body))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response).await, b"\x89PNG\r\n");

    let seen = renderer.seen.lock().unwrap();
    assert_eq!(seen[0], RenderRequest { url: "https://example.test".into(), mobile: true, width: Some(414.0) });
}

#[tokio::test]
async fn missing_url_is_bad_request() {
    let renderer = Arc::new(MockRenderer::default());
    let response = capture(State(state(renderer.clone())), Ok(Json(CaptureRequest::default()))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(renderer.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn blank_url_is_bad_request() {
    let renderer = Arc::new(MockRenderer::default());
    let body = CaptureRequest { url: Some("   ".into()), ..CaptureRequest::default() };
    let response = capture(State(state(renderer)), Ok(Json(body))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn render_failure_is_500_with_message() {
    let renderer = Arc::new(MockRenderer { fail: true, ..MockRenderer::default() });
    let body = CaptureRequest { url: Some("https://slow.test".into()), ..CaptureRequest::default() };
    let response = capture(State(state(renderer)), Ok(Json(body))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("page load timed out"), "{text}");
}

#[tokio::test]
async fn non_json_body_is_bad_request() {
    let app = crate::routes::app(state(Arc::new(MockRenderer::default())));
    let response = app
        .oneshot(Request::post("/").header("content-type", "text/plain").body(Body::from("url=x")).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn routed_capture_and_healthz() {
    let app = crate::routes::app(state(Arc::new(MockRenderer::default())));
    let response = app
        .clone()
        .oneshot(
            Request::post("/")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url":"https://example.test"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = app.oneshot(Request::get("/healthz").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
