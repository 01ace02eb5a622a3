//! Shared fixtures: in-process API servers and pre-wired clients.

use std::sync::Arc;

use axum::Router;

use crate::config::ClientConfig;
use crate::http::ApiClient;
use crate::session::SessionContext;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });
    format!("http://{addr}")
}

/// Client against `base_url` with a fresh in-memory session.
pub(crate) fn client(base_url: &str) -> ApiClient {
    let session = Arc::new(SessionContext::in_memory());
    ApiClient::new(&ClientConfig::default().with_base_url(base_url), session).expect("client builds")
}

/// Client against `base_url` that is already logged in as `u-1` / `c-1`.
pub(crate) fn logged_in_client(base_url: &str) -> ApiClient {
    let api = client(base_url);
    api.session().login("u-1", "c-1").expect("login stored");
    api
}
