//! Screenshot capture route.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::browser::RenderRequest;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CaptureRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mobile: Option<bool>,
    #[serde(default)]
    pub width: Option<f64>,
}

impl CaptureRequest {
    /// The render job, or `None` when `url` is missing or blank.
    #[must_use]
    pub fn into_render_request(self) -> Option<RenderRequest> {
        let url = self.url.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty())?;
        Some(RenderRequest { url, mobile: self.mobile.unwrap_or(false), width: self.width })
    }
}

/// `POST /`: render `{url, mobile?, width?}` to PNG.
pub async fn capture(State(state): State<AppState>, payload: Result<Json<CaptureRequest>, JsonRejection>) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            info!(error = %rejection, "rejected capture body");
            return (StatusCode::BAD_REQUEST, "request body must be a JSON object").into_response();
        }
    };
    let Some(request) = body.into_render_request() else {
        return (StatusCode::BAD_REQUEST, "url is required").into_response();
    };

    let span = info_span!("capture", request_id = %Uuid::new_v4(), url = %request.url, mobile = request.mobile);
    async move {
        let started = Instant::now();
        match state.renderer.render(&request).await {
            Ok(png) => {
                info!(bytes = png.len(), elapsed_ms = started.elapsed().as_millis(), "screenshot captured");
                ([(CONTENT_TYPE, "image/png")], png).into_response()
            }
            Err(e) => {
                error!(error = %e, elapsed_ms = started.elapsed().as_millis(), "screenshot failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod tests;
