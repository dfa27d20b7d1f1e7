//! Media repository for database operations
//!
//! Availability, the borrower back-reference and the loan start date are
//! owned by the loan ledger; nothing here ever writes them outside of
//! deletion cleanup.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::media::{CreateMedia, Media, MediaQuery, MediaRow, UpdateMedia},
};

#[derive(Clone)]
pub struct MediaRepository {
    pool: Pool<Postgres>,
}

impl MediaRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get media by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Media> {
        let row = sqlx::query_as::<_, MediaRow>("SELECT * FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Search media with category/availability/name filters and pagination
    pub async fn search(&self, query: &MediaQuery) -> AppResult<(Vec<Media>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let category = query.category.map(|c| c.as_str());
        let pattern = query
            .name
            .as_ref()
            .map(|n| format!("%{}%", n.to_lowercase()));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM media
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NULL OR available = $2)
              AND ($3::text IS NULL OR LOWER(name) LIKE $3 OR LOWER(author) LIKE $3)
            "#,
        )
        .bind(category)
        .bind(query.available)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT * FROM media
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NULL OR available = $2)
              AND ($3::text IS NULL OR LOWER(name) LIKE $3 OR LOWER(author) LIKE $3)
            ORDER BY name, id
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(category)
        .bind(query.available)
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Media::from).collect(), total))
    }

    /// Create a new media item (available by default)
    pub async fn create(&self, media: &CreateMedia) -> AppResult<Media> {
        let details = media
            .details
            .clone()
            .unwrap_or_else(|| crate::models::media::CategoryDetails::empty(media.category));
        let columns = details.into_columns();

        let row = sqlx::query_as::<_, MediaRow>(
            r#"
            INSERT INTO media (name, author, category, nb_pages, genre, release_date,
                               players_min, players_max)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&media.name)
        .bind(&media.author)
        .bind(media.category.as_str())
        .bind(columns.nb_pages)
        .bind(&columns.genre)
        .bind(columns.release_date)
        .bind(columns.players_min)
        .bind(columns.players_max)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update name/author and category-specific attributes. The availability
    /// columns are deliberately absent from the statement.
    pub async fn update(&self, id: i32, media: &UpdateMedia) -> AppResult<Media> {
        let columns = media.details.clone().map(|d| d.into_columns());

        let row = sqlx::query_as::<_, MediaRow>(
            r#"
            UPDATE media SET
                name = COALESCE($2, name),
                author = COALESCE($3, author),
                nb_pages = CASE WHEN $4 THEN $5 ELSE nb_pages END,
                genre = CASE WHEN $4 THEN $6 ELSE genre END,
                release_date = CASE WHEN $4 THEN $7 ELSE release_date END,
                players_min = CASE WHEN $4 THEN $8 ELSE players_min END,
                players_max = CASE WHEN $4 THEN $9 ELSE players_max END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&media.name)
        .bind(&media.author)
        .bind(columns.is_some())
        .bind(columns.as_ref().and_then(|c| c.nb_pages))
        .bind(columns.as_ref().and_then(|c| c.genre.clone()))
        .bind(columns.as_ref().and_then(|c| c.release_date))
        .bind(columns.as_ref().and_then(|c| c.players_min))
        .bind(columns.as_ref().and_then(|c| c.players_max))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Delete a media item. Refused while an open loan holds it unless
    /// `force` is set; the loan history goes with it (FK cascade).
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM media WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Media with id {} not found", id)));
        }

        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE media_id = $1 AND effective_return_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if on_loan && !force {
            return Err(AppError::Conflict("Media is currently on loan".to_string()));
        }

        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count all media and how many are available
    pub async fn count(&self) -> AppResult<(i64, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media")
            .fetch_one(&self.pool)
            .await?;
        let available: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM media WHERE available = TRUE")
                .fetch_one(&self.pool)
                .await?;
        Ok((total, available))
    }
}
