//! Outbound HTTP wrapper.
//!
//! Every REST call goes through [`ApiClient`], which:
//! - attaches the session headers when a session exists (never on login),
//! - turns a 401 into a forced logout plus a call to the registered
//!   [`UnauthorizedHandler`] (a 401 on login is only a bad password),
//! - maps other non-2xx responses to [`ClientError::Status`].
//!
//! There is no retry; failures are terminal for the call.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionContext;

/// Header names as sent on the wire (HTTP header names are case-insensitive).
pub const HEADER_UID: &str = "x-auth-uid";
pub const HEADER_COOKIE: &str = "x-auth-cookie";
pub const HEADER_IMPERSONATE: &str = "x-auth-impersonate";

/// The one endpoint that never carries session headers.
pub const LOGIN_PATH: &str = "/api/login";

/// Reacts to the server rejecting the session, after it has been cleared.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
    on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http, base_url: config.base_url.clone(), session, on_unauthorized: None })
    }

    #[must_use]
    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// # Errors
    ///
    /// See [`ApiClient`] for the error mapping.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.dispatch(self.request(Method::GET, path), path).await?;
        Ok(response.json::<T>().await?)
    }

    /// # Errors
    ///
    /// See [`ApiClient`] for the error mapping.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch(self.request(Method::POST, path).json(body), path)
            .await?;
        Ok(response.json::<T>().await?)
    }

    /// # Errors
    ///
    /// See [`ApiClient`] for the error mapping.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch(self.request(Method::PUT, path).json(body), path)
            .await?;
        Ok(response.json::<T>().await?)
    }

    /// Delete a resource; any response body is discarded.
    ///
    /// # Errors
    ///
    /// See [`ApiClient`] for the error mapping.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.dispatch(self.request(Method::DELETE, path), path)
            .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Session headers for `path`. Empty for the login endpoint or when logged out.
    pub(crate) fn auth_headers(&self, path: &str) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        if path == LOGIN_PATH {
            return Ok(headers);
        }
        let Some(credentials) = self.session.credentials() else {
            return Ok(headers);
        };

        headers.insert(HEADER_UID, HeaderValue::from_str(&credentials.uid)?);
        headers.insert(HEADER_COOKIE, HeaderValue::from_str(&credentials.cookie)?);
        if let Some(account) = credentials.impersonate.as_deref() {
            headers.insert(HEADER_IMPERSONATE, HeaderValue::from_str(account)?);
        }
        Ok(headers)
    }

    async fn dispatch(&self, request: RequestBuilder, path: &str) -> Result<Response, ClientError> {
        let response = request.headers(self.auth_headers(path)?).send().await?;
        let status = response.status();
        debug!(%path, status = status.as_u16(), "api response");

        if status == StatusCode::UNAUTHORIZED {
            if path == LOGIN_PATH {
                return Err(ClientError::InvalidCredentials);
            }
            self.end_session(path);
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status: status.as_u16(), body });
        }

        Ok(response)
    }

    fn end_session(&self, path: &str) {
        warn!(%path, "request rejected with 401; ending session");
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "failed to clear session storage");
        }
        if let Some(handler) = &self.on_unauthorized {
            handler.on_unauthorized();
        }
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
