//! Media directory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::media::{CreateMedia, Media, MediaQuery, UpdateMedia},
};

/// Generic paginated response wrapper
#[derive(serde::Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub force: Option<bool>,
}

/// List media with filters and pagination
#[utoipa::path(
    get,
    path = "/media",
    tag = "media",
    params(
        ("category" = Option<String>, Query, description = "Filter by category (book, dvd, cd, board)"),
        ("available" = Option<bool>, Query, description = "When true, only items without an open loan"),
        ("name" = Option<String>, Query, description = "Search by title or author"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of media", body = PaginatedResponse<Media>)
    )
)]
pub async fn list_media(
    State(state): State<crate::AppState>,
    Query(query): Query<MediaQuery>,
) -> AppResult<Json<PaginatedResponse<Media>>> {
    let (items, total) = state.services.catalog.search_media(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get media details by ID
#[utoipa::path(
    get,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = i32, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media details", body = Media),
        (status = 404, description = "Media not found")
    )
)]
pub async fn get_media(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Media>> {
    let media = state.services.catalog.get_media(id).await?;
    Ok(Json(media))
}

/// Create a new media item
#[utoipa::path(
    post,
    path = "/media",
    tag = "media",
    request_body = CreateMedia,
    responses(
        (status = 201, description = "Media created", body = Media),
        (status = 400, description = "Invalid input or mismatched attribute bundle")
    )
)]
pub async fn create_media(
    State(state): State<crate::AppState>,
    Json(media): Json<CreateMedia>,
) -> AppResult<(StatusCode, Json<Media>)> {
    let created = state.services.catalog.create_media(media).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing media item
#[utoipa::path(
    put,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = i32, Path, description = "Media ID")
    ),
    request_body = UpdateMedia,
    responses(
        (status = 200, description = "Media updated", body = Media),
        (status = 404, description = "Media not found")
    )
)]
pub async fn update_media(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(media): Json<UpdateMedia>,
) -> AppResult<Json<Media>> {
    let updated = state.services.catalog.update_media(id, media).await?;
    Ok(Json(updated))
}

/// Delete a media item
#[utoipa::path(
    delete,
    path = "/media/{id}",
    tag = "media",
    params(
        ("id" = i32, Path, description = "Media ID"),
        ("force" = Option<bool>, Query, description = "Force delete even while on loan")
    ),
    responses(
        (status = 204, description = "Media deleted"),
        (status = 404, description = "Media not found"),
        (status = 409, description = "Media is currently on loan")
    )
)]
pub async fn delete_media(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteParams>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .delete_media(id, params.force.unwrap_or(false))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
