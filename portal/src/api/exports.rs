//! List exports: request one, then poll until the file is ready.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{JobStatus, item_path};
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::poll::{PollPolicy, poll_until};

pub const EXPORTS_PATH: &str = "/api/exports";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub id: String,
    #[serde(default)]
    pub list_id: String,
    #[serde(default)]
    pub status: JobStatus,
    /// Download location once `status` is `complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest<'a> {
    list_id: &'a str,
}

#[derive(Clone)]
pub struct Exports {
    api: ApiClient,
}

impl Exports {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Start exporting `list_id`.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn create(&self, list_id: &str) -> Result<Export, ClientError> {
        let export: Export = self.api.post(EXPORTS_PATH, &ExportRequest { list_id }).await?;
        info!(id = %export.id, %list_id, "export requested");
        Ok(export)
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn get(&self, id: &str) -> Result<Export, ClientError> {
        self.api.get(&item_path(EXPORTS_PATH, id)).await
    }

    /// Poll until the export completes or fails.
    ///
    /// # Errors
    ///
    /// Propagates fetch errors. A failed export is returned as `Ok` with
    /// `status == JobStatus::Error`.
    pub async fn wait(&self, id: &str) -> Result<Export, ClientError> {
        self.wait_with(id, PollPolicy::EXPORT).await
    }

    /// [`Exports::wait`] with a custom policy.
    ///
    /// # Errors
    ///
    /// See [`Exports::wait`].
    pub async fn wait_with(&self, id: &str, policy: PollPolicy) -> Result<Export, ClientError> {
        poll_until(policy, || self.get(id), |export| export.status.is_terminal()).await
    }
}

#[cfg(test)]
#[path = "exports_test.rs"]
mod tests;
