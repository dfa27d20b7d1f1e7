//! Loans repository: the ledger owning the open/close transition.
//!
//! Both transitions run as a single transaction so the loan row and the
//! media availability flag always move together. Row locks (`FOR UPDATE`)
//! on the member and the media serialize concurrent admission checks; a
//! partial unique index on open loans per media is the store-level backstop.

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanMedia, LoanMember},
    services::policy::{self, OpenLoanTerms},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

const LOAN_DETAILS_SELECT: &str = r#"
    SELECT l.id, l.loan_date, l.expected_return_date, l.effective_return_date,
           md.id as media_id, md.name as media_name, md.author as media_author,
           md.category as media_category,
           m.id as member_id, m.name as member_name, m.first_name as member_first_name
    FROM loans l
    JOIN media md ON l.media_id = md.id
    JOIN members m ON l.member_id = m.id
"#;

fn details_from_row(row: &sqlx::postgres::PgRow, today: NaiveDate) -> AppResult<LoanDetails> {
    let expected_return_date: NaiveDate = row.get("expected_return_date");
    let effective_return_date: Option<NaiveDate> = row.get("effective_return_date");
    let category: String = row.get("media_category");

    Ok(LoanDetails {
        id: row.get("id"),
        loan_date: row.get("loan_date"),
        expected_return_date,
        effective_return_date,
        media: LoanMedia {
            id: row.get("media_id"),
            name: row.get("media_name"),
            author: row.get("media_author"),
            category: category
                .parse()
                .map_err(|e: String| AppError::Internal(e))?,
        },
        member: LoanMember {
            id: row.get("member_id"),
            name: row.get("member_name"),
            first_name: row.get("member_first_name"),
        },
        is_overdue: effective_return_date.is_none() && expected_return_date < today,
    })
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get one loan with display details
    pub async fn get_details(&self, id: i32, today: NaiveDate) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", LOAN_DETAILS_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        details_from_row(&row, today)
    }

    /// Open loans for a member, soonest due first
    pub async fn get_member_loans(
        &self,
        member_id: i32,
        today: NaiveDate,
    ) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE l.member_id = $1 AND l.effective_return_date IS NULL \
             ORDER BY l.expected_return_date, l.id",
            LOAN_DETAILS_SELECT
        );
        let rows = sqlx::query(&query)
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| details_from_row(row, today)).collect()
    }

    /// The open loan currently holding a media item, if any. There is at
    /// most one (partial unique index).
    pub async fn get_media_open_loan(
        &self,
        media_id: i32,
        today: NaiveDate,
    ) -> AppResult<Option<LoanDetails>> {
        let query = format!(
            "{} WHERE l.media_id = $1 AND l.effective_return_date IS NULL",
            LOAN_DETAILS_SELECT
        );
        let row = sqlx::query(&query)
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| details_from_row(&row, today)).transpose()
    }

    /// Count a member's open loans
    pub async fn count_open_for_member(&self, member_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND effective_return_date IS NULL",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Open a new loan: admission check and state flip in one transaction.
    ///
    /// On any failure nothing is written; on success the loan row exists and
    /// the media is unavailable with the borrower back-reference set.
    pub async fn open_loan(
        &self,
        member_id: i32,
        media_id: i32,
        loan_date: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        // Lock the member row so concurrent opens for the same borrower
        // observe a consistent open-loan snapshot
        let member: Option<i32> =
            sqlx::query_scalar("SELECT id FROM members WHERE id = $1 FOR UPDATE")
                .bind(member_id)
                .fetch_optional(&mut *tx)
                .await?;
        if member.is_none() {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }

        // Lock the media row so two concurrent admits cannot both see it
        // available before either flips the flag
        let available: Option<bool> =
            sqlx::query_scalar("SELECT available FROM media WHERE id = $1 FOR UPDATE")
                .bind(media_id)
                .fetch_optional(&mut *tx)
                .await?;
        let available = available.ok_or_else(|| {
            AppError::NotFound(format!("Media with id {} not found", media_id))
        })?;

        let open_loans = sqlx::query_as::<_, OpenLoanTerms>(
            "SELECT expected_return_date FROM loans \
             WHERE member_id = $1 AND effective_return_date IS NULL",
        )
        .bind(member_id)
        .fetch_all(&mut *tx)
        .await?;

        let expected_return_date = policy::admit(available, &open_loans, loan_date, today)?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (member_id, media_id, loan_date, expected_return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(media_id)
        .bind(loan_date)
        .bind(expected_return_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE media SET available = FALSE, borrower_id = $1, loan_start_date = $2 \
             WHERE id = $3",
        )
        .bind(member_id)
        .bind(loan_date)
        .bind(media_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Close an open loan: validation and state flip in one transaction.
    pub async fn close_loan(
        &self,
        loan_id: i32,
        effective_return_date: NaiveDate,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.effective_return_date.is_some() {
            return Err(AppError::AlreadyReturned);
        }

        if effective_return_date < loan.loan_date {
            return Err(AppError::InvalidReturnDate(format!(
                "Return date {} precedes loan date {}",
                effective_return_date, loan.loan_date
            )));
        }

        let closed = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET effective_return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(effective_return_date)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE media SET available = TRUE, borrower_id = NULL, loan_start_date = NULL \
             WHERE id = $1",
        )
        .bind(loan.media_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(closed)
    }

    /// Count open loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE effective_return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count open loans past their expected return date
    pub async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans \
             WHERE effective_return_date IS NULL AND expected_return_date < $1",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Open loans grouped by media category
    pub async fn count_active_by_category(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT md.category as label, COUNT(*) as value
            FROM loans l
            JOIN media md ON l.media_id = md.id
            WHERE l.effective_return_date IS NULL
            GROUP BY md.category
            ORDER BY value DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("label"), row.get("value")))
            .collect())
    }
}
