//! Suppression lists: uploaded address lists that are processed server-side.

use serde::{Deserialize, Serialize};

use super::{JobStatus, item_path};
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::poll::{PollPolicy, poll_until};

pub const SUPPRESSION_PATH: &str = "/api/suppression";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionList {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: JobStatus,
    /// Number of suppressed addresses once processing finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Clone)]
pub struct Suppression {
    api: ApiClient,
}

impl Suppression {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn list(&self) -> Result<Vec<SuppressionList>, ClientError> {
        self.api.get(SUPPRESSION_PATH).await
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn get(&self, id: &str) -> Result<SuppressionList, ClientError> {
        self.api.get(&item_path(SUPPRESSION_PATH, id)).await
    }

    /// Poll until the list has been processed (or failed to process).
    ///
    /// # Errors
    ///
    /// Propagates fetch errors.
    pub async fn wait_processed(&self, id: &str) -> Result<SuppressionList, ClientError> {
        self.wait_processed_with(id, PollPolicy::SUPPRESSION).await
    }

    /// # Errors
    ///
    /// Propagates fetch errors.
    pub async fn wait_processed_with(&self, id: &str, policy: PollPolicy) -> Result<SuppressionList, ClientError> {
        poll_until(policy, || self.get(id), |list| list.status.is_terminal()).await
    }
}

#[cfg(test)]
#[path = "suppression_test.rs"]
mod tests;
