//! Segment CRUD.
//!
//! Create and update validate the document first and refuse to send an
//! invalid one, mirroring the editor's disabled submit button. The subset
//! range rule (percent in `0..=100`, whole non-negative count) is checked
//! on the same path.

use ::segments::{Segment, validate};
use tracing::info;

use super::item_path;

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::navigation::DraftSaver;

pub const SEGMENTS_PATH: &str = "/api/segments";

#[derive(Clone)]
pub struct Segments {
    api: ApiClient,
}

impl Segments {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn list(&self) -> Result<Vec<Segment>, ClientError> {
        self.api.get(SEGMENTS_PATH).await
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn get(&self, id: &str) -> Result<Segment, ClientError> {
        self.api.get(&item_path(SEGMENTS_PATH, id)).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] or [`ClientError::InvalidSubset`]
    /// without sending anything when the segment cannot be submitted.
    pub async fn create(&self, segment: &Segment) -> Result<Segment, ClientError> {
        check_submittable(segment)?;
        let created: Segment = self.api.post(SEGMENTS_PATH, segment).await?;
        info!(id = ?created.id, name = %created.name, "segment created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::MissingField`] when the segment has no id, and
    /// [`ClientError::Validation`] or [`ClientError::InvalidSubset`] when it
    /// cannot be submitted.
    pub async fn update(&self, segment: &Segment) -> Result<Segment, ClientError> {
        let id = segment.id.as_deref().ok_or(ClientError::MissingField("id"))?;
        check_submittable(segment)?;
        let updated = self.api.put(&item_path(SEGMENTS_PATH, id), segment).await?;
        info!(%id, "segment updated");
        Ok(updated)
    }

    /// Create or update depending on whether the segment has an id yet.
    ///
    /// # Errors
    ///
    /// See [`Segments::create`] and [`Segments::update`].
    pub async fn save(&self, segment: &Segment) -> Result<Segment, ClientError> {
        if segment.id.is_some() {
            self.update(segment).await
        } else {
            self.create(segment).await
        }
    }

    /// # Errors
    ///
    /// Propagates transport and status errors.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.api.delete(&item_path(SEGMENTS_PATH, id)).await?;
        info!(%id, "segment deleted");
        Ok(())
    }
}

#[async_trait::async_trait]
impl DraftSaver<Segment> for Segments {
    async fn save(&self, draft: &Segment) -> Result<Segment, ClientError> {
        Segments::save(self, draft).await
    }
}

fn check_submittable(segment: &Segment) -> Result<(), ClientError> {
    validate(segment)?;
    if let Some(subset) = &segment.subset {
        subset.check()?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "segments_test.rs"]
mod tests;
