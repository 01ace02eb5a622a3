//! Sent and scheduled broadcasts (read-only).

use serde::{Deserialize, Serialize};

use super::item_path;
use crate::error::ClientError;
use crate::http::ApiClient;

pub const BROADCASTS_PATH: &str = "/api/broadcasts";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    /// Server-defined lifecycle label (`draft`, `scheduled`, `sent`, ...).
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
}

#[derive(Clone)]
pub struct Broadcasts {
    api: ApiClient,
}

impl Broadcasts {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn list(&self) -> Result<Vec<Broadcast>, ClientError> {
        self.api.get(BROADCASTS_PATH).await
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn get(&self, id: &str) -> Result<Broadcast, ClientError> {
        self.api.get(&item_path(BROADCASTS_PATH, id)).await
    }
}
