//! Members repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, MemberQuery, MemberShort, UpdateMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Check if email already exists (case-insensitive)
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Search members with pagination, with open-loan counters per member
    pub async fn search(
        &self,
        query: &MemberQuery,
        today: NaiveDate,
    ) -> AppResult<(Vec<MemberShort>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let pattern = query
            .name
            .as_ref()
            .map(|n| format!("%{}%", n.to_lowercase()));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM members
            WHERE ($1::text IS NULL OR LOWER(name) LIKE $1 OR LOWER(first_name) LIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, MemberShort>(
            r#"
            SELECT m.id, m.name, m.first_name,
                   (SELECT COUNT(*) FROM loans l
                     WHERE l.member_id = m.id AND l.effective_return_date IS NULL) as nb_loans,
                   (SELECT COUNT(*) FROM loans l
                     WHERE l.member_id = m.id AND l.effective_return_date IS NULL
                       AND l.expected_return_date < $2) as nb_late_loans
            FROM members m
            WHERE ($1::text IS NULL OR LOWER(m.name) LIKE $1 OR LOWER(m.first_name) LIKE $1)
            ORDER BY m.name, m.first_name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&pattern)
        .bind(today)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((members, total))
    }

    /// Create a new member
    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, first_name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&member.name)
        .bind(&member.first_name)
        .bind(&member.email)
        .bind(&member.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing member (unset fields keep their current value)
    pub async fn update(&self, id: i32, member: &UpdateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE members SET
                name = COALESCE($2, name),
                first_name = COALESCE($3, first_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&member.name)
        .bind(&member.first_name)
        .bind(&member.email)
        .bind(&member.phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Delete a member. Refused while the member has open loans unless
    /// `force` is set, in which case the held media are released and the
    /// member's loans are removed with the member (FK cascade), all in one
    /// transaction.
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND effective_return_date IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans > 0 {
            if !force {
                return Err(AppError::Conflict(format!(
                    "Member has {} open loan(s)",
                    open_loans
                )));
            }
            // Release the media held by the member before the cascade
            sqlx::query(
                r#"
                UPDATE media SET available = TRUE, borrower_id = NULL, loan_start_date = NULL
                WHERE id IN (
                    SELECT media_id FROM loans
                    WHERE member_id = $1 AND effective_return_date IS NULL
                )
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count all members
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
