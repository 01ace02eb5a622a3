//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the renderer behind a trait object so handlers can be exercised
//! without a browser.

use std::sync::Arc;

use crate::browser::Renderer;

#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }
}
