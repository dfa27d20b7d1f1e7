//! Member directory service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, MemberQuery, MemberShort, UpdateMember},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search members with pagination
    pub async fn search_members(&self, query: &MemberQuery) -> AppResult<(Vec<MemberShort>, i64)> {
        let today = Utc::now().date_naive();
        self.repository.members.search(query, today).await
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Create a new member
    pub async fn create_member(&self, member: CreateMember) -> AppResult<Member> {
        member
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref email) = member.email {
            if self.repository.members.email_exists(email, None).await? {
                return Err(AppError::Conflict(format!(
                    "A member with email {} already exists",
                    email
                )));
            }
        }

        let created = self.repository.members.create(&member).await?;
        tracing::info!("Member {} created: {} {}", created.id, created.name, created.first_name);
        Ok(created)
    }

    /// Update an existing member
    pub async fn update_member(&self, id: i32, member: UpdateMember) -> AppResult<Member> {
        member
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref email) = member.email {
            if self.repository.members.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "A member with email {} already exists",
                    email
                )));
            }
        }

        self.repository.members.update(id, &member).await
    }

    /// Delete a member. Refused with open loans unless `force` is set.
    pub async fn delete_member(&self, id: i32, force: bool) -> AppResult<()> {
        self.repository.members.delete(id, force).await?;
        tracing::info!("Member {} deleted (force={})", id, force);
        Ok(())
    }
}
