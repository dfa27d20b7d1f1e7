//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

/// A labeled counter
#[derive(Debug, Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberStats {
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaStats {
    pub total: i64,
    pub available: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoanStats {
    pub active: i64,
    pub overdue: i64,
    pub by_category: Vec<StatEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub members: MemberStats,
    pub media: MediaStats,
    pub loans: LoanStats,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
