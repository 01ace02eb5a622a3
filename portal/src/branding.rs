//! Tenant branding: logo, favicon, and custom stylesheet.
//!
//! ERROR HANDLING
//! ==============
//! Branding is cosmetic. A failed fetch is logged and the default assets are
//! applied instead; callers never see an error.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::http::ApiClient;

pub const BRANDING_PATH: &str = "/api/branding";
pub const DEFAULT_LOGO: &str = "/static/logo.svg";
pub const DEFAULT_FAVICON: &str = "/favicon.ico";

/// Visual configuration of one tenant. Missing fields mean "use the default".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub custom_css: Option<String>,
}

impl Branding {
    #[must_use]
    pub fn logo_or_default(&self) -> &str {
        self.logo.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_LOGO)
    }

    #[must_use]
    pub fn favicon_or_default(&self) -> &str {
        self.favicon.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_FAVICON)
    }

    #[must_use]
    pub fn stylesheet(&self) -> Option<&str> {
        self.custom_css.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Where branding lands: a browser document, a rendered page head, a test double.
pub trait Document: Send + Sync {
    fn set_logo(&self, src: &str);
    fn set_favicon(&self, href: &str);
    /// Replace the injected stylesheet; `None` removes it.
    fn set_stylesheet(&self, css: Option<&str>);
}

// =============================================================================
// HEAD DOCUMENT
// =============================================================================

#[derive(Debug, Default)]
struct HeadState {
    logo: String,
    favicon: String,
    stylesheet: Option<String>,
}

/// Document that renders branding into an HTML `<head>` fragment.
#[derive(Debug, Default)]
pub struct HeadDocument {
    state: Mutex<HeadState>,
}

impl HeadDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn logo(&self) -> String {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).logo.clone()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = format!(r#"<link rel="icon" href="{}">"#, escape_attr(&state.favicon));
        if let Some(css) = &state.stylesheet {
            out.push_str("\n<style id=\"custom-branding\">");
            out.push_str(&css.replace("</", "<\\/"));
            out.push_str("</style>");
        }
        out
    }
}

impl Document for HeadDocument {
    fn set_logo(&self, src: &str) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).logo = src.to_owned();
    }

    fn set_favicon(&self, href: &str) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).favicon = href.to_owned();
    }

    fn set_stylesheet(&self, css: Option<&str>) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stylesheet = css.map(str::to_owned);
    }
}

fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

// =============================================================================
// CONTEXT
// =============================================================================

pub struct BrandingContext {
    api: ApiClient,
    document: Arc<dyn Document>,
    current: RwLock<Branding>,
}

impl BrandingContext {
    #[must_use]
    pub fn new(api: ApiClient, document: Arc<dyn Document>) -> Self {
        Self { api, document, current: RwLock::new(Branding::default()) }
    }

    /// Fetch the tenant's branding and push it into the document.
    /// Falls back to defaults on any failure.
    pub async fn apply(&self) -> Branding {
        let branding = match self.api.get::<Branding>(BRANDING_PATH).await {
            Ok(branding) => {
                info!(custom_css = branding.stylesheet().is_some(), "tenant branding loaded");
                branding
            }
            Err(e) => {
                warn!(error = %e, "branding fetch failed; using defaults");
                Branding::default()
            }
        };
        self.apply_branding(&branding);
        branding
    }

    /// Push `branding` into the document without fetching.
    pub fn apply_branding(&self, branding: &Branding) {
        self.document.set_logo(branding.logo_or_default());
        self.document.set_favicon(branding.favicon_or_default());
        self.document.set_stylesheet(branding.stylesheet());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = branding.clone();
    }

    #[must_use]
    pub fn current(&self) -> Branding {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
#[path = "branding_test.rs"]
mod tests;
