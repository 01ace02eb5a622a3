//! Typed wrappers over the portal's REST resources.
//!
//! Each resource is a small handle holding a clone of the [`ApiClient`];
//! handles are cheap and can be created per call.

pub mod billing;
pub mod broadcasts;
pub mod exports;
pub mod lists;
pub mod segments;
pub mod suppression;

use serde::{Deserialize, Serialize};

pub use billing::{Billing, Payment, PaymentStatus};
pub use broadcasts::{Broadcast, Broadcasts};
pub use exports::{Export, Exports};
pub use lists::{Lists, MailingList};
pub use self::segments::Segments;
pub use suppression::{Suppression, SuppressionList};

/// Lifecycle of a server-side background job (export, suppression import).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Complete,
    Error,
}

impl JobStatus {
    /// Whether polling should stop. Failure is terminal too; it is reported
    /// on the record, not as an error.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// `{collection}/{id}` with `id` percent-encoded as a single path segment.
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Error => "error",
        })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
