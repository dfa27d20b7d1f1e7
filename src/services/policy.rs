//! Loan admission policy.
//!
//! `admit` is a pure decision function: the ledger gathers the borrower's
//! open-loan snapshot and the media availability under row locks, asks for a
//! verdict, then performs the state mutation itself. The clock is an
//! explicit parameter; nothing here reads ambient context.

use chrono::{Duration, NaiveDate};
use sqlx::FromRow;

use crate::error::PolicyError;

/// Fixed lending window
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// Maximum simultaneous open loans per member
pub const MAX_OPEN_LOANS: usize = 3;

/// The terms of one open loan, as much as admission needs to know
#[derive(Debug, Clone, Copy, FromRow)]
pub struct OpenLoanTerms {
    pub expected_return_date: NaiveDate,
}

/// Decide whether a proposed loan may be opened.
///
/// Checks run in a fixed order and short-circuit on the first failure:
/// media availability, then the open-loan cap, then the overdue block.
/// Returns the expected return date (`loan_date` + the lending window).
pub fn admit(
    media_available: bool,
    open_loans: &[OpenLoanTerms],
    loan_date: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, PolicyError> {
    if !media_available {
        return Err(PolicyError::MediaUnavailable);
    }

    if open_loans.len() >= MAX_OPEN_LOANS {
        return Err(PolicyError::BorrowingLimitExceeded);
    }

    if open_loans
        .iter()
        .any(|loan| loan.expected_return_date < today)
    {
        return Err(PolicyError::OverdueLoansExist);
    }

    Ok(loan_date + Duration::days(LOAN_PERIOD_DAYS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn open(expected: &str) -> OpenLoanTerms {
        OpenLoanTerms {
            expected_return_date: date(expected),
        }
    }

    #[test]
    fn test_admit_computes_return_window() {
        let today = date("2025-01-01");
        let expected = admit(true, &[], today, today).unwrap();
        assert_eq!(expected, date("2025-01-08"));
    }

    #[test]
    fn test_admit_rejects_unavailable_media() {
        let today = date("2025-01-10");
        assert_eq!(
            admit(false, &[], today, today),
            Err(PolicyError::MediaUnavailable)
        );
    }

    #[test]
    fn test_admit_rejects_fourth_loan() {
        let today = date("2025-01-01");
        let loans = [
            open("2025-01-08"),
            open("2025-01-08"),
            open("2025-01-08"),
        ];
        assert_eq!(
            admit(true, &loans, today, today),
            Err(PolicyError::BorrowingLimitExceeded)
        );
    }

    #[test]
    fn test_admit_rejects_overdue_borrower() {
        // Open loan due 2025-01-05, asked again on 2025-01-10
        let today = date("2025-01-10");
        let loans = [open("2025-01-05")];
        assert_eq!(
            admit(true, &loans, today, today),
            Err(PolicyError::OverdueLoansExist)
        );
    }

    #[test]
    fn test_admit_due_today_is_not_overdue() {
        let today = date("2025-01-05");
        let loans = [open("2025-01-05")];
        assert_eq!(admit(true, &loans, today, today), Ok(date("2025-01-12")));
    }

    #[test]
    fn test_availability_checked_before_quota_and_overdue() {
        // Borrower is both at the cap and overdue; the unavailable media
        // still decides the verdict
        let today = date("2025-01-10");
        let loans = [
            open("2025-01-05"),
            open("2025-01-12"),
            open("2025-01-12"),
        ];
        assert_eq!(
            admit(false, &loans, today, today),
            Err(PolicyError::MediaUnavailable)
        );
    }

    #[test]
    fn test_quota_checked_before_overdue() {
        let today = date("2025-01-10");
        let loans = [
            open("2025-01-05"),
            open("2025-01-12"),
            open("2025-01-12"),
        ];
        assert_eq!(
            admit(true, &loans, today, today),
            Err(PolicyError::BorrowingLimitExceeded)
        );
    }

    #[test]
    fn test_overdue_blocks_regardless_of_target_media() {
        let today = date("2025-01-10");
        let loans = [open("2025-01-05")];
        // The targeted media being available does not help
        assert_eq!(
            admit(true, &loans, today, today),
            Err(PolicyError::OverdueLoansExist)
        );
    }

    #[test]
    fn test_backdated_loan_window() {
        let today = date("2025-03-15");
        let expected = admit(true, &[], date("2025-03-01"), today).unwrap();
        assert_eq!(expected, date("2025-03-08"));
    }
}
