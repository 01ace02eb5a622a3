use super::*;
use crate::branding::{BRANDING_PATH, HeadDocument};
use crate::navigation::{GuardFuture, HistoryNavigator};
use crate::test_support::serve;
use axum::Json;
use axum::routing::{get, post};

fn router() -> axum::Router {
    axum::Router::new()
        .route(
            LOGIN_PATH,
            post(|Json(body): Json<serde_json::Value>| async move {
                if body["password"] == "hunter2" {
                    Ok(Json(serde_json::json!({"uid": "u-7", "cookie": "ck-7"})))
                } else {
                    Err(axum::http::StatusCode::UNAUTHORIZED)
                }
            }),
        )
        .route(BRANDING_PATH, get(|| async { Json(serde_json::json!({"logo": "/tenant.svg"})) }))
        .route("/api/lists", get(|| async { axum::http::StatusCode::UNAUTHORIZED }))
}

async fn portal() -> (Portal, Arc<HistoryNavigator>, Arc<HeadDocument>) {
    let base = serve(router()).await;
    let navigator = Arc::new(HistoryNavigator::new());
    let document = Arc::new(HeadDocument::new());
    let portal = Portal::new(
        &ClientConfig::default().with_base_url(&base),
        Arc::new(SessionContext::in_memory()),
        document.clone(),
        navigator.clone(),
    )
    .unwrap();
    (portal, navigator, document)
}

#[tokio::test]
async fn login_persists_identity_and_applies_branding() {
    let (portal, _nav, document) = portal().await;
    let branding = portal.login("ada", "hunter2").await.unwrap();

    let credentials = portal.session().credentials().unwrap();
    assert_eq!(credentials.uid, "u-7");
    assert_eq!(credentials.cookie, "ck-7");
    assert_eq!(branding.logo.as_deref(), Some("/tenant.svg"));
    assert_eq!(document.logo(), "/tenant.svg");
}

#[tokio::test]
async fn bad_password_does_not_redirect() {
    let (portal, nav, _doc) = portal().await;
    let err = portal.login("ada", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials));
    assert_eq!(err.notice(), "Incorrect username or password.");
    assert!(!portal.session().is_logged_in());
    assert!(nav.visited().is_empty());
}

#[tokio::test]
async fn rejected_session_redirects_to_login_past_the_guard() {
    let (portal, nav, _doc) = portal().await;
    portal.login("ada", "hunter2").await.unwrap();
    let _handle = portal
        .guard()
        .register(Arc::new(|| -> GuardFuture { Box::pin(async { Ok(false) }) }));

    let err = portal.lists().list().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!portal.session().is_logged_in());
    assert!(!portal.guard().is_armed());
    assert_eq!(nav.current().as_deref(), Some(LOGIN_ROUTE));
}

#[tokio::test]
async fn logout_clears_session_and_navigates() {
    let (portal, nav, _doc) = portal().await;
    portal.login("ada", "hunter2").await.unwrap();
    portal.logout().unwrap();
    assert!(!portal.session().is_logged_in());
    assert_eq!(nav.current().as_deref(), Some(LOGIN_ROUTE));
}

#[tokio::test]
async fn navigate_consults_guard() {
    let (portal, nav, _doc) = portal().await;
    let handle = portal
        .guard()
        .register(Arc::new(|| -> GuardFuture { Box::pin(async { Ok(false) }) }));
    assert!(!portal.navigate("/segments").await);
    drop(handle);
    assert!(portal.navigate("/segments").await);
    assert_eq!(nav.visited(), vec!["/segments".to_owned()]);
}
