//! Contact lists (read-only).

use serde::{Deserialize, Serialize};

use super::item_path;
use crate::error::ClientError;
use crate::http::ApiClient;

pub const LISTS_PATH: &str = "/api/lists";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingList {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subscriber_count: u64,
}

#[derive(Clone)]
pub struct Lists {
    api: ApiClient,
}

impl Lists {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn list(&self) -> Result<Vec<MailingList>, ClientError> {
        self.api.get(LISTS_PATH).await
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn get(&self, id: &str) -> Result<MailingList, ClientError> {
        self.api.get(&item_path(LISTS_PATH, id)).await
    }
}

#[cfg(test)]
#[path = "lists_test.rs"]
mod tests;
