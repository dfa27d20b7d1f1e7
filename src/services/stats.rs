//! Statistics service

use chrono::Utc;

use crate::{
    api::stats::{LoanStats, MediaStats, MemberStats, StatEntry, StatsResponse},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get library statistics: member/media totals and loan activity
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let today = Utc::now().date_naive();

        let members_total = self.repository.members.count().await?;
        let (media_total, media_available) = self.repository.media.count().await?;
        let active_loans = self.repository.loans.count_active().await?;
        let overdue_loans = self.repository.loans.count_overdue(today).await?;

        let by_category = self
            .repository
            .loans
            .count_active_by_category()
            .await?
            .into_iter()
            .map(|(label, value)| StatEntry { label, value })
            .collect();

        Ok(StatsResponse {
            members: MemberStats {
                total: members_total,
            },
            media: MediaStats {
                total: media_total,
                available: media_available,
            },
            loans: LoanStats {
                active: active_loans,
                overdue: overdue_loans,
                by_category,
            },
        })
    }
}
