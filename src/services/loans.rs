//! Loan management service

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails},
    repository::Repository,
};

/// Default the loan date to today; backdating is allowed, the future is not.
fn resolve_loan_date(requested: Option<NaiveDate>, today: NaiveDate) -> AppResult<NaiveDate> {
    let loan_date = requested.unwrap_or(today);
    if loan_date > today {
        return Err(AppError::InvalidReturnDate(format!(
            "Loan date {} is in the future",
            loan_date
        )));
    }
    Ok(loan_date)
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a loan by ID
    pub async fn get_loan(&self, loan_id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(loan_id).await
    }

    /// Open loans for a member (step one of the return flow)
    pub async fn member_loans(&self, member_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;

        let today = Utc::now().date_naive();
        self.repository.loans.get_member_loans(member_id, today).await
    }

    /// The open loan currently holding a media item, if any
    pub async fn media_loan(&self, media_id: i32) -> AppResult<Option<LoanDetails>> {
        // Verify media exists
        self.repository.media.get_by_id(media_id).await?;

        let today = Utc::now().date_naive();
        self.repository.loans.get_media_open_loan(media_id, today).await
    }

    /// A member's open-loan count, as used by admission
    pub async fn member_active_count(&self, member_id: i32) -> AppResult<i64> {
        self.repository.members.get_by_id(member_id).await?;
        self.repository.loans.count_open_for_member(member_id).await
    }

    /// Open a new loan (borrow a media item)
    pub async fn open_loan(&self, request: CreateLoan) -> AppResult<Loan> {
        let today = Utc::now().date_naive();
        let loan_date = resolve_loan_date(request.loan_date, today)?;

        let loan = self
            .repository
            .loans
            .open_loan(request.member_id, request.media_id, loan_date, today)
            .await?;

        tracing::info!(
            "Loan {} opened: member {} borrowed media {} until {}",
            loan.id,
            loan.member_id,
            loan.media_id,
            loan.expected_return_date
        );
        Ok(loan)
    }

    /// Close an open loan (return a media item)
    pub async fn close_loan(
        &self,
        loan_id: i32,
        effective_return_date: NaiveDate,
    ) -> AppResult<LoanDetails> {
        let closed = self
            .repository
            .loans
            .close_loan(loan_id, effective_return_date)
            .await?;

        tracing::info!(
            "Loan {} closed: media {} returned on {}",
            closed.id,
            closed.media_id,
            effective_return_date
        );

        let today = Utc::now().date_naive();
        self.repository.loans.get_details(closed.id, today).await
    }

    /// Count open loans
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.loans.count_active().await
    }

    /// Count overdue open loans
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let today = Utc::now().date_naive();
        self.repository.loans.count_overdue(today).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_loan_date_defaults_to_today() {
        let today = date("2025-01-10");
        assert_eq!(resolve_loan_date(None, today).unwrap(), today);
    }

    #[test]
    fn test_backdated_loan_date_is_allowed() {
        let today = date("2025-01-10");
        assert_eq!(
            resolve_loan_date(Some(date("2024-12-01")), today).unwrap(),
            date("2024-12-01")
        );
    }

    #[test]
    fn test_future_loan_date_is_rejected() {
        let today = date("2025-01-10");
        assert!(matches!(
            resolve_loan_date(Some(date("2025-01-11")), today),
            Err(AppError::InvalidReturnDate(_))
        ));
    }
}
