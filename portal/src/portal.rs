//! Composition root: session, HTTP, branding, and navigation in one place.
//!
//! A 401 from any request clears the session, drops whatever navigation guard
//! is installed, and sends the navigator to [`LOGIN_ROUTE`]. The guard is
//! bypassed there: a rejected session cannot auto-save anything.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{Billing, Broadcasts, Exports, Lists, Segments, Suppression};
use crate::branding::{Branding, BrandingContext, Document};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{ApiClient, LOGIN_PATH, UnauthorizedHandler};
use crate::navigation::{NavigationGuard, Navigator};
use crate::session::SessionContext;

pub const LOGIN_ROUTE: &str = "/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    uid: Option<String>,
    cookie: Option<String>,
}

/// Forced-logout redirect installed on the [`ApiClient`].
struct RedirectToLogin {
    guard: Arc<NavigationGuard>,
    navigator: Arc<dyn Navigator>,
}

impl UnauthorizedHandler for RedirectToLogin {
    fn on_unauthorized(&self) {
        self.guard.clear();
        self.navigator.go(LOGIN_ROUTE);
    }
}

pub struct Portal {
    api: ApiClient,
    branding: BrandingContext,
    guard: Arc<NavigationGuard>,
    navigator: Arc<dyn Navigator>,
}

impl Portal {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionContext>,
        document: Arc<dyn Document>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let guard = NavigationGuard::new();
        let redirect = Arc::new(RedirectToLogin { guard: Arc::clone(&guard), navigator: Arc::clone(&navigator) });
        let api = ApiClient::new(config, session)?.with_unauthorized_handler(redirect);
        let branding = BrandingContext::new(api.clone(), document);
        Ok(Self { api, branding, guard, navigator })
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        self.api.session()
    }

    #[must_use]
    pub fn guard(&self) -> &Arc<NavigationGuard> {
        &self.guard
    }

    #[must_use]
    pub fn branding(&self) -> &BrandingContext {
        &self.branding
    }

    /// Authenticate, persist the returned identity, and apply tenant branding.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCredentials`] for a bad password and
    /// [`ClientError::MissingField`] when the response lacks the identity.
    pub async fn login(&self, username: &str, password: &str) -> Result<Branding, ClientError> {
        let response: LoginResponse = self.api.post(LOGIN_PATH, &LoginRequest { username, password }).await?;
        let uid = response.uid.filter(|s| !s.is_empty()).ok_or(ClientError::MissingField("uid"))?;
        let cookie = response.cookie.filter(|s| !s.is_empty()).ok_or(ClientError::MissingField("cookie"))?;
        self.session().login(&uid, &cookie)?;
        info!(%username, "logged in");
        Ok(self.branding.apply().await)
    }

    /// Clear identity and installed guard, then go to the login route.
    ///
    /// # Errors
    ///
    /// Returns an error if session storage cannot be cleared.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session().logout()?;
        self.guard.clear();
        self.navigator.go(LOGIN_ROUTE);
        Ok(())
    }

    /// Navigate through the guard. Returns whether navigation happened.
    pub async fn navigate(&self, to: &str) -> bool {
        self.guard.navigate(self.navigator.as_ref(), to).await
    }

    #[must_use]
    pub fn segments(&self) -> Segments {
        Segments::new(self.api.clone())
    }

    #[must_use]
    pub fn broadcasts(&self) -> Broadcasts {
        Broadcasts::new(self.api.clone())
    }

    #[must_use]
    pub fn lists(&self) -> Lists {
        Lists::new(self.api.clone())
    }

    #[must_use]
    pub fn suppression(&self) -> Suppression {
        Suppression::new(self.api.clone())
    }

    #[must_use]
    pub fn exports(&self) -> Exports {
        Exports::new(self.api.clone())
    }

    #[must_use]
    pub fn billing(&self) -> Billing {
        Billing::new(self.api.clone())
    }
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;
