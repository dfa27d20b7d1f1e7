//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full member model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    /// Surname
    pub name: String,
    pub first_name: String,
    /// Unique across members when present
    pub email: Option<String>,
    pub phone: Option<String>,
    pub creation_date: DateTime<Utc>,
}

/// Short member representation for lists, with open-loan counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MemberShort {
    pub id: i32,
    pub name: String,
    pub first_name: String,
    pub nb_loans: Option<i64>,
    pub nb_late_loans: Option<i64>,
}

/// Member query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MemberQuery {
    /// Matches surname or first name, case-insensitive
    pub name: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters"))]
    pub first_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 15, message = "Phone must be 1-15 characters"))]
    pub phone: String,
}

/// Update member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters"))]
    pub first_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 15, message = "Phone must be 1-15 characters"))]
    pub phone: Option<String>,
}
