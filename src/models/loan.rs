//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::media::MediaCategory;

/// Loan model from database. A loan is open while `effective_return_date`
/// is null; setting it closes the loan permanently.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub member_id: i32,
    pub media_id: i32,
    pub loan_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub effective_return_date: Option<NaiveDate>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.effective_return_date.is_none()
    }
}

/// Media fields embedded in loan listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanMedia {
    pub id: i32,
    pub name: String,
    pub author: String,
    pub category: MediaCategory,
}

/// Member fields embedded in loan listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanMember {
    pub id: i32,
    pub name: String,
    pub first_name: String,
}

/// Loan with full details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub loan_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub effective_return_date: Option<NaiveDate>,
    pub media: LoanMedia,
    pub member: LoanMember,
    pub is_overdue: bool,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub member_id: i32,
    pub media_id: i32,
    /// Defaults to today; may be backdated but never in the future
    pub loan_date: Option<NaiveDate>,
}

/// Return loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnLoan {
    pub effective_return_date: NaiveDate,
}
