//! Media registry service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::media::{CreateMedia, Media, MediaQuery, UpdateMedia},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search media with filters
    pub async fn search_media(&self, query: &MediaQuery) -> AppResult<(Vec<Media>, i64)> {
        self.repository.media.search(query).await
    }

    /// Get media by ID
    pub async fn get_media(&self, id: i32) -> AppResult<Media> {
        self.repository.media.get_by_id(id).await
    }

    /// Create a new media item
    pub async fn create_media(&self, media: CreateMedia) -> AppResult<Media> {
        media
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref details) = media.details {
            if details.category() != media.category {
                return Err(AppError::Validation(format!(
                    "Attribute bundle is for category '{}', media is '{}'",
                    details.category(),
                    media.category
                )));
            }
        }

        let created = self.repository.media.create(&media).await?;
        tracing::info!(
            "Media {} created: {} ({})",
            created.id,
            created.name,
            created.category
        );
        Ok(created)
    }

    /// Update an existing media item. The category is immutable and the
    /// attribute bundle, when given, must match it.
    pub async fn update_media(&self, id: i32, media: UpdateMedia) -> AppResult<Media> {
        media
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref details) = media.details {
            let existing = self.repository.media.get_by_id(id).await?;
            if details.category() != existing.category {
                return Err(AppError::Validation(format!(
                    "Attribute bundle is for category '{}', media is '{}'",
                    details.category(),
                    existing.category
                )));
            }
        }

        self.repository.media.update(id, &media).await
    }

    /// Delete a media item. Refused while on loan unless `force` is set.
    pub async fn delete_media(&self, id: i32, force: bool) -> AppResult<()> {
        self.repository.media.delete(id, force).await?;
        tracing::info!("Media {} deleted (force={})", id, force);
        Ok(())
    }
}
