//! Headless browser: launch, discovery, and one-tab-per-request rendering.
//!
//! DESIGN
//! ======
//! The service owns a single browser process and a single DevTools
//! connection to it. Every render opens a fresh tab, attaches to it with a
//! flat session, and closes it again whatever the outcome. Renders are not
//! pooled, queued, or limited; concurrent requests share the browser.
//!
//! Render sequence:
//! 1. `Target.createTarget` + `Target.attachToTarget { flatten: true }`
//! 2. viewport emulation (touch for mobile)
//! 3. `Page.navigate`, then wait for `Page.loadEventFired` on that session
//! 4. settle delay, measure content height, `Page.captureScreenshot`
//! 5. `Target.closeTarget`

use std::process::Stdio;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::process::{Child, Command};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::cdp::{CdpConnection, CdpError, CdpEvent};
use crate::config::ServiceConfig;

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
const DISCOVERY_POLL: Duration = Duration::from_millis(100);
/// Upper bound on full-page capture height, in CSS pixels.
pub const MAX_CAPTURE_HEIGHT: u32 = 16_384;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(#[source] std::io::Error),
    #[error("browser debugger not reachable: {0}")]
    Discovery(String),
    #[error(transparent)]
    Cdp(#[from] CdpError),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("page load timed out after {0:?}")]
    LoadTimeout(Duration),
    #[error("devtools response missing `{0}`")]
    MissingField(&'static str),
    #[error("screenshot data is not base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

// =============================================================================
// VIEWPORT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
}

impl Viewport {
    pub const DESKTOP: Self = Self { width: 1280, height: 800, device_scale_factor: 1.0, mobile: false };
    pub const MOBILE: Self = Self { width: 375, height: 667, device_scale_factor: 2.0, mobile: true };
    pub const MIN_WIDTH: u32 = 320;
    pub const MAX_WIDTH: u32 = 3840;

    /// Preset for the device class, with an optional width override clamped
    /// to [`Viewport::MIN_WIDTH`]..=[`Viewport::MAX_WIDTH`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_request(mobile: bool, width: Option<f64>) -> Self {
        let mut viewport = if mobile { Self::MOBILE } else { Self::DESKTOP };
        if let Some(width) = width.filter(|w| w.is_finite()) {
            let clamped = width.round().clamp(f64::from(Self::MIN_WIDTH), f64::from(Self::MAX_WIDTH));
            viewport.width = clamped as u32;
        }
        viewport
    }

    fn metrics_params(self) -> Value {
        json!({
            "width": self.width,
            "height": self.height,
            "deviceScaleFactor": self.device_scale_factor,
            "mobile": self.mobile,
        })
    }
}

/// One inbound capture job.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub url: String,
    pub mobile: bool,
    pub width: Option<f64>,
}

#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render `request` to PNG bytes.
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}

// =============================================================================
// LAUNCH + DISCOVERY
// =============================================================================

/// Fixed command-line flags for the headless browser.
#[must_use]
pub fn chrome_args(debug_port: u16) -> Vec<String> {
    vec![
        "--headless".to_owned(),
        "--disable-gpu".to_owned(),
        "--no-sandbox".to_owned(),
        "--hide-scrollbars".to_owned(),
        "--no-first-run".to_owned(),
        format!("--remote-debugging-port={debug_port}"),
        "about:blank".to_owned(),
    ]
}

#[derive(Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_url: String,
}

/// Poll `version_url` (`/json/version`) until the browser reports its
/// debugger WebSocket URL.
///
/// # Errors
///
/// Returns [`RenderError::Discovery`] if nothing answers within `timeout`.
pub async fn discover_ws_url(version_url: &str, timeout: Duration) -> Result<String, RenderError> {
    let http = reqwest::Client::builder()
        .timeout(DISCOVERY_POLL * 10)
        .build()
        .map_err(|e| RenderError::Discovery(e.to_string()))?;
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let last_error = match fetch_version(&http, version_url).await {
            Ok(info) => return Ok(info.ws_url),
            Err(e) => e,
        };
        if tokio::time::Instant::now() >= deadline {
            return Err(RenderError::Discovery(last_error));
        }
        tokio::time::sleep(DISCOVERY_POLL).await;
    }
}

async fn fetch_version(http: &reqwest::Client, version_url: &str) -> Result<VersionInfo, String> {
    let response = http
        .get(version_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| e.to_string())?;
    response.json::<VersionInfo>().await.map_err(|e| e.to_string())
}

// =============================================================================
// BROWSER
// =============================================================================

pub struct Browser {
    cdp: CdpConnection,
    page_load_timeout: Duration,
    settle_delay: Duration,
    // Killed on drop.
    process: Option<Child>,
}

impl Browser {
    /// Spawn the browser binary and connect to its debugger.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot start or never exposes its
    /// debugger endpoint.
    pub async fn launch(config: &ServiceConfig) -> Result<Self, RenderError> {
        let process = Command::new(&config.chrome_bin)
            .args(chrome_args(config.chrome_debug_port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(RenderError::Launch)?;
        info!(bin = %config.chrome_bin, port = config.chrome_debug_port, "browser launched");

        let version_url = format!("http://127.0.0.1:{}/json/version", config.chrome_debug_port);
        let ws_url = discover_ws_url(&version_url, DISCOVERY_TIMEOUT).await?;
        let mut browser = Self::connect(&ws_url, config).await?;
        browser.process = Some(process);
        Ok(browser)
    }

    /// Attach to an already running browser.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Cdp`] if the WebSocket cannot be opened.
    pub async fn connect(ws_url: &str, config: &ServiceConfig) -> Result<Self, RenderError> {
        let cdp = CdpConnection::connect(ws_url, config.cdp_call_timeout).await?;
        info!(%ws_url, "devtools session ready");
        Ok(Self {
            cdp,
            page_load_timeout: config.page_load_timeout,
            settle_delay: config.settle_delay,
            process: None,
        })
    }

    /// OS process id of a browser started by [`Browser::launch`].
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(Child::id)
    }

    async fn capture_in_tab(&self, target_id: &str, url: &str, viewport: Viewport) -> Result<Vec<u8>, RenderError> {
        let attached = self
            .cdp
            .call("Target.attachToTarget", json!({ "targetId": target_id, "flatten": true }), None)
            .await?;
        let session_id = str_field(&attached, "sessionId")?;
        let session = Some(session_id);

        self.cdp.call("Page.enable", json!({}), session).await?;
        self.cdp
            .call("Emulation.setDeviceMetricsOverride", viewport.metrics_params(), session)
            .await?;
        if viewport.mobile {
            self.cdp
                .call("Emulation.setTouchEmulationEnabled", json!({ "enabled": true, "maxTouchPoints": 5 }), session)
                .await?;
        }

        let mut events = self.cdp.subscribe();
        let navigated = self.cdp.call("Page.navigate", json!({ "url": url }), session).await?;
        if let Some(reason) = navigated.get("errorText").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            return Err(RenderError::Navigation { url: url.to_owned(), reason: reason.to_owned() });
        }
        let loaded = wait_for_event(&mut events, "Page.loadEventFired", session_id, self.page_load_timeout).await?;
        debug!(%url, timestamp = ?loaded.params.get("timestamp"), "page loaded");
        tokio::time::sleep(self.settle_delay).await;

        let metrics = self.cdp.call("Page.getLayoutMetrics", json!({}), session).await?;
        let height = content_height(&metrics).unwrap_or(viewport.height);
        let shot = self
            .cdp
            .call("Page.captureScreenshot", capture_params(viewport, height), session)
            .await?;
        Ok(BASE64.decode(str_field(&shot, "data")?)?)
    }
}

#[async_trait::async_trait]
impl Renderer for Browser {
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        if self.cdp.is_closed() {
            return Err(RenderError::Cdp(CdpError::Closed));
        }
        let viewport = Viewport::for_request(request.mobile, request.width);
        let created = self
            .cdp
            .call("Target.createTarget", json!({ "url": "about:blank" }), None)
            .await?;
        let target_id = str_field(&created, "targetId")?.to_owned();
        debug!(%target_id, url = %request.url, "tab opened");

        let result = self.capture_in_tab(&target_id, &request.url, viewport).await;

        if let Err(e) = self
            .cdp
            .call("Target.closeTarget", json!({ "targetId": target_id }), None)
            .await
        {
            warn!(%target_id, error = %e, "failed to close tab");
        }
        result
    }
}

/// Wait for `method` on `session_id`, ignoring other traffic.
async fn wait_for_event(
    events: &mut broadcast::Receiver<CdpEvent>,
    method: &str,
    session_id: &str,
    timeout: Duration,
) -> Result<CdpEvent, RenderError> {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) if event.method == method && event.session_id.as_deref() == Some(session_id) => {
                    return Ok(event);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "event subscriber lagged"),
                Err(RecvError::Closed) => return Err(RenderError::Cdp(CdpError::Closed)),
            }
        }
    };
    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| RenderError::LoadTimeout(timeout))?
}

/// Full document height from `Page.getLayoutMetrics`, capped at
/// [`MAX_CAPTURE_HEIGHT`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn content_height(metrics: &Value) -> Option<u32> {
    let height = metrics
        .get("cssContentSize")
        .or_else(|| metrics.get("contentSize"))?
        .get("height")?
        .as_f64()
        .filter(|h| h.is_finite() && *h > 0.0)?;
    Some(height.ceil().min(f64::from(MAX_CAPTURE_HEIGHT)) as u32)
}

#[must_use]
pub fn capture_params(viewport: Viewport, height: u32) -> Value {
    json!({
        "format": "png",
        "captureBeyondViewport": true,
        "clip": { "x": 0, "y": 0, "width": viewport.width, "height": height.max(viewport.height), "scale": 1 },
    })
}

fn str_field<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, RenderError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or(RenderError::MissingField(field))
}

#[cfg(test)]
#[path = "browser_test.rs"]
mod tests;
